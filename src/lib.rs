pub mod activity_log;
pub mod catalogue;
pub mod compare;
pub mod config;
pub mod detail;
pub mod error;
pub mod favorites;
pub mod history;
pub mod http_client;
pub mod model;
pub mod pipeline;
pub mod signal;
pub mod sources;
pub mod storage;
pub mod worker;

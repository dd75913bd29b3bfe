use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::activity_log::ActivityLog;
use crate::catalogue::PlayerCatalogue;
use crate::sources::{BundledPlayerSource, HttpPlayerSource, HttpTeamSource, PlayerSource};
use crate::storage::{FileStore, KeyValueStore, NoopStore, PersistentStore};

const DEFAULT_API_URL: &str = "https://www.thesportsdb.com/api/v1/json/3";
const APP_DIR: &str = "courtside";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    /// Full player collection endpoint. Opt-in: the public API has no
    /// league-wide player listing, so `None` serves the bundled data.
    pub players_url: Option<String>,
    pub per_page: usize,
    pub debounce: Duration,
    /// `None` selects the no-op store.
    pub storage_dir: Option<PathBuf>,
    pub offline: bool,
    pub fetch_parallelism: usize,
    pub log_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            players_url: None,
            per_page: 12,
            debounce: Duration::from_millis(300),
            storage_dir: default_storage_dir(),
            offline: false,
            fetch_parallelism: 4,
            log_stderr: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = env::var("COURTSIDE_API_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);
        let players_url = env::var("COURTSIDE_PLAYERS_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let per_page = env::var("COURTSIDE_PER_PAGE")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.per_page)
            .clamp(1, 100);
        let debounce_ms = env::var("COURTSIDE_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(300)
            .min(5000);
        let storage_disabled = env::var("COURTSIDE_STORAGE")
            .map(|v| v.trim().eq_ignore_ascii_case("off"))
            .unwrap_or(false);
        let storage_dir = if storage_disabled {
            None
        } else {
            env::var("COURTSIDE_STORAGE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .or(defaults.storage_dir)
        };
        let fetch_parallelism = env::var("COURTSIDE_FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.fetch_parallelism)
            .clamp(1, 16);

        Self {
            api_url,
            players_url,
            per_page,
            debounce: Duration::from_millis(debounce_ms),
            storage_dir,
            offline: env_flag("COURTSIDE_OFFLINE"),
            fetch_parallelism,
            log_stderr: env_flag("COURTSIDE_LOG_STDERR"),
        }
    }

    pub fn activity_log(&self) -> ActivityLog {
        ActivityLog::new().with_stderr_mirror(self.log_stderr)
    }

    pub fn storage(&self, log: &ActivityLog) -> PersistentStore {
        let backend: Arc<dyn KeyValueStore> = match self.storage_dir.as_ref() {
            Some(dir) => Arc::new(FileStore::new(dir.clone())),
            None => {
                log.info("Persistent storage unavailable, favorites and history are session-only");
                Arc::new(NoopStore)
            }
        };
        PersistentStore::new(backend, log.clone())
    }

    pub fn catalogue(&self, log: &ActivityLog) -> PlayerCatalogue {
        let primary: Option<Box<dyn PlayerSource>> = if self.offline {
            None
        } else {
            self.players_url
                .as_ref()
                .map(|url| Box::new(HttpPlayerSource::new(url.clone())) as Box<dyn PlayerSource>)
        };
        let catalogue = PlayerCatalogue::new(primary, Box::new(BundledPlayerSource), log.clone());
        if self.offline {
            catalogue
        } else {
            catalogue.with_team_source(Box::new(HttpTeamSource::new(self.api_url.clone())))
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn default_storage_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

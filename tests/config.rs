use std::time::Duration;

use courtside::activity_log::ActivityLog;
use courtside::config::Config;

#[test]
fn defaults_serve_bundled_players_without_primary_source() {
    let config = Config::default();
    assert_eq!(config.players_url, None);
    assert_eq!(config.per_page, 12);
    assert_eq!(config.debounce, Duration::from_millis(300));

    let log = ActivityLog::new();
    let catalogue = config.catalogue(&log);
    let page = catalogue.get_players(1, None, config.per_page).expect("bundled data");
    assert_eq!(page.meta.total_count, 24);
    assert!(!log.contains("using fallback"));
}

#[test]
fn storage_off_uses_session_only_store() {
    let config = Config {
        storage_dir: None,
        ..Config::default()
    };
    let log = ActivityLog::new();
    let store = config.storage(&log);
    store.save("nba_search_history", &["curry".to_string()]);
    assert!(store.load::<String>("nba_search_history").is_empty());
    assert!(log.contains("session-only"));
}

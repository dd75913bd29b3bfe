use std::sync::Arc;

use courtside::activity_log::ActivityLog;
use courtside::model::Player;
use courtside::storage::{
    FAVORITES_KEY, FileStore, KeyValueStore, MemoryStore, NoopStore, PersistentStore,
    SEARCH_HISTORY_KEY,
};

fn player(id: &str, name: &str) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        team: "Boston Celtics".to_string(),
        sport: "Basketball".to_string(),
        position: Some("Forward".to_string()),
        nationality: None,
        height: None,
        weight: None,
        photo_url: None,
        birth_date: None,
        jersey_number: None,
        team_id: None,
    }
}

fn store_over(mem: &MemoryStore) -> (PersistentStore, ActivityLog) {
    let log = ActivityLog::new();
    (
        PersistentStore::new(Arc::new(mem.clone()), log.clone()),
        log,
    )
}

#[test]
fn entity_sequence_survives_save_and_load() {
    let mem = MemoryStore::new();
    let (store, _) = store_over(&mem);
    let players = vec![player("1", "Jayson Tatum"), player("2", "Jaylen Brown")];

    store.save(FAVORITES_KEY, &players);
    let loaded: Vec<Player> = store.load_entities(FAVORITES_KEY);
    assert_eq!(loaded, players);
}

#[test]
fn malformed_json_is_cleared() {
    let mem = MemoryStore::new();
    mem.put_raw(FAVORITES_KEY, "{not json");
    let (store, log) = store_over(&mem);

    let loaded: Vec<Player> = store.load_entities(FAVORITES_KEY);
    assert!(loaded.is_empty());
    assert!(!mem.contains(FAVORITES_KEY));
    assert!(log.contains("not valid JSON"));
}

#[test]
fn non_array_and_empty_array_are_cleared() {
    let mem = MemoryStore::new();
    let (store, _) = store_over(&mem);

    mem.put_raw(SEARCH_HISTORY_KEY, r#"{"terms": ["curry"]}"#);
    assert!(store.load::<String>(SEARCH_HISTORY_KEY).is_empty());
    assert!(!mem.contains(SEARCH_HISTORY_KEY));

    mem.put_raw(SEARCH_HISTORY_KEY, "[]");
    assert!(store.load::<String>(SEARCH_HISTORY_KEY).is_empty());
    assert!(!mem.contains(SEARCH_HISTORY_KEY));
}

#[test]
fn plain_sequence_with_wrong_element_type_is_cleared() {
    let mem = MemoryStore::new();
    mem.put_raw(SEARCH_HISTORY_KEY, r#"["curry", 42]"#);
    let (store, _) = store_over(&mem);

    assert!(store.load::<String>(SEARCH_HISTORY_KEY).is_empty());
    assert!(!mem.contains(SEARCH_HISTORY_KEY));
}

#[test]
fn invalid_entities_are_dropped_and_written_back() {
    let mem = MemoryStore::new();
    mem.put_raw(
        FAVORITES_KEY,
        r#"[
            {"idPlayer": "7", "strPlayer": "Kevin Durant", "strTeam": "Suns"},
            {"idPlayer": "", "strPlayer": "Ghost"},
            "not an object",
            null,
            {"strPlayer": "No Id"}
        ]"#,
    );
    let (store, log) = store_over(&mem);

    let loaded: Vec<Player> = store.load_entities(FAVORITES_KEY);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "7");
    assert!(log.contains("repaired"));

    let raw = mem.get(FAVORITES_KEY).expect("repaired value should be stored");
    let stored: serde_json::Value = serde_json::from_str(&raw).expect("stored json");
    assert_eq!(stored.as_array().map(|a| a.len()), Some(1));
}

#[test]
fn all_invalid_entities_clear_the_key() {
    let mem = MemoryStore::new();
    mem.put_raw(FAVORITES_KEY, r#"[{"name": "x"}, 3]"#);
    let (store, _) = store_over(&mem);

    assert!(store.load_entities::<Player>(FAVORITES_KEY).is_empty());
    assert!(!mem.contains(FAVORITES_KEY));
}

#[test]
fn write_failure_is_logged_not_raised() {
    let mem = MemoryStore::with_quota(16);
    let (store, log) = store_over(&mem);

    store.save(FAVORITES_KEY, &[player("1", "A very long player name indeed")]);
    assert!(!mem.contains(FAVORITES_KEY));
    assert!(log.contains("write failed"));
}

#[test]
fn noop_store_reads_nothing_and_accepts_writes() {
    let store = PersistentStore::noop(ActivityLog::new());
    store.save(SEARCH_HISTORY_KEY, &["curry".to_string()]);
    assert!(store.load::<String>(SEARCH_HISTORY_KEY).is_empty());
    store.clear(SEARCH_HISTORY_KEY);
    assert!(NoopStore.get(SEARCH_HISTORY_KEY).is_none());
}

#[test]
fn file_store_persists_across_instances() {
    let dir = std::env::temp_dir().join(format!("courtside-store-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let first = FileStore::new(&dir);
    first
        .set(SEARCH_HISTORY_KEY, r#"["curry"]"#)
        .expect("write should succeed");

    let second = FileStore::new(&dir);
    assert_eq!(second.get(SEARCH_HISTORY_KEY).as_deref(), Some(r#"["curry"]"#));
    second.remove(SEARCH_HISTORY_KEY);
    assert!(first.get(SEARCH_HISTORY_KEY).is_none());

    let _ = std::fs::remove_dir_all(&dir);
}

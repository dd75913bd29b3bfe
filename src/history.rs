use crate::activity_log::ActivityLog;
use crate::signal::{Signal, SubscriptionId};
use crate::storage::{PersistentStore, SEARCH_HISTORY_KEY};

pub const MAX_HISTORY: usize = 5;
pub const MIN_TERM_LEN: usize = 2;

/// Recent search terms, most recent first, unique ignoring case.
pub struct SearchHistoryStore {
    history: Signal<Vec<String>>,
    storage: PersistentStore,
    log: ActivityLog,
}

impl SearchHistoryStore {
    pub fn new(storage: PersistentStore, log: ActivityLog) -> Self {
        let mut loaded: Vec<String> = storage.load(SEARCH_HISTORY_KEY);
        let before = loaded.clone();
        loaded = normalize(loaded);
        if loaded != before {
            persist_list(&storage, &loaded);
        }
        Self {
            history: Signal::new(loaded),
            storage,
            log,
        }
    }

    pub fn history(&self) -> &[String] {
        self.history.get()
    }

    pub fn add_search(&mut self, term: &str) {
        let trimmed = term.trim();
        if trimmed.chars().count() < MIN_TERM_LEN {
            return;
        }
        let lowered = trimmed.to_lowercase();
        let mut updated = Vec::with_capacity(MAX_HISTORY);
        updated.push(trimmed.to_string());
        updated.extend(
            self.history
                .get()
                .iter()
                .filter(|t| t.to_lowercase() != lowered)
                .cloned(),
        );
        updated.truncate(MAX_HISTORY);
        self.history.set(updated);
        self.log.info(format!("Search recorded: {trimmed}"));
        self.persist();
    }

    /// Removes an exact (case-sensitive) match.
    pub fn remove_item(&mut self, term: &str) {
        let updated: Vec<String> = self
            .history
            .get()
            .iter()
            .filter(|t| t.as_str() != term)
            .cloned()
            .collect();
        self.history.set(updated);
        self.persist();
    }

    pub fn clear_history(&mut self) {
        self.history.set(Vec::new());
        self.storage.clear(SEARCH_HISTORY_KEY);
        self.log.info("Search history cleared");
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&Vec<String>) + Send + 'static,
    ) -> SubscriptionId {
        self.history.subscribe(callback)
    }

    fn persist(&self) {
        persist_list(&self.storage, self.history.get());
    }
}

// Empty lists are stored as an absent key, same as favorites.
fn persist_list(storage: &PersistentStore, list: &[String]) {
    if list.is_empty() {
        storage.clear(SEARCH_HISTORY_KEY);
    } else {
        storage.save(SEARCH_HISTORY_KEY, list);
    }
}

fn normalize(list: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(MAX_HISTORY);
    for term in list {
        let trimmed = term.trim();
        if trimmed.chars().count() < MIN_TERM_LEN {
            continue;
        }
        let lowered = trimmed.to_lowercase();
        if out.iter().any(|t| t.to_lowercase() == lowered) {
            continue;
        }
        out.push(trimmed.to_string());
        if out.len() == MAX_HISTORY {
            break;
        }
    }
    out
}

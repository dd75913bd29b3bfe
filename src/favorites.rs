use crate::activity_log::ActivityLog;
use crate::model::{Player, PlayerKey};
use crate::signal::{Signal, SubscriptionId};
use crate::storage::{FAVORITES_KEY, PersistentStore};

/// Favorited players in insertion order, unique by id.
///
/// An empty set is stored as an absent key, never as `[]`.
pub struct FavoritesStore {
    favorites: Signal<Vec<Player>>,
    storage: PersistentStore,
    log: ActivityLog,
}

impl FavoritesStore {
    pub fn new(storage: PersistentStore, log: ActivityLog) -> Self {
        let mut loaded: Vec<Player> = storage.load_entities(FAVORITES_KEY);
        // Duplicates can only come from hand-edited storage.
        let before = loaded.len();
        let mut seen = std::collections::HashSet::new();
        loaded.retain(|p| seen.insert(p.id.clone()));
        if loaded.len() != before {
            storage.save(FAVORITES_KEY, &loaded);
        }
        log.info(format!("Favorites loaded: {}", loaded.len()));
        Self {
            favorites: Signal::new(loaded),
            storage,
            log,
        }
    }

    pub fn favorites(&self) -> &[Player] {
        self.favorites.get()
    }

    pub fn count(&self) -> usize {
        self.favorites.get().len()
    }

    pub fn is_favorite(&self, id: impl Into<PlayerKey>) -> bool {
        let key = id.into();
        self.favorites.get().iter().any(|p| p.id == key.as_str())
    }

    pub fn add(&mut self, player: &Player) {
        if self.is_favorite(player) {
            return;
        }
        let mut updated = self.favorites.get().clone();
        updated.push(player.clone());
        self.favorites.set(updated);
        self.log.info(format!("Favorite added: {}", player.name));
        self.persist();
    }

    pub fn remove(&mut self, id: impl Into<PlayerKey>) {
        let key = id.into();
        let updated: Vec<Player> = self
            .favorites
            .get()
            .iter()
            .filter(|p| p.id != key.as_str())
            .cloned()
            .collect();
        self.favorites.set(updated);
        self.log.info(format!("Favorite removed: {key}"));
        self.persist();
    }

    pub fn toggle(&mut self, player: &Player) {
        if self.is_favorite(player) {
            self.remove(player);
        } else {
            self.add(player);
        }
    }

    pub fn clear_all(&mut self) {
        self.favorites.set(Vec::new());
        self.storage.clear(FAVORITES_KEY);
        self.log.info("Favorites cleared");
    }

    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&Vec<Player>) + Send + 'static,
    ) -> SubscriptionId {
        self.favorites.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.favorites.unsubscribe(id)
    }

    fn persist(&self) {
        let current = self.favorites.get();
        if current.is_empty() {
            self.storage.clear(FAVORITES_KEY);
        } else {
            self.storage.save(FAVORITES_KEY, current);
        }
    }
}

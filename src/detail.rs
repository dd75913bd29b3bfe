use std::time::{Duration, Instant};

use crate::error::CatalogueError;
use crate::model::{Player, PlayerKey};

pub const NOT_FOUND_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Players,
    PlayerDetail(PlayerKey),
    Compare,
    NotFound,
}

impl Route {
    /// Resolves an app path such as `/players/134060`.
    pub fn parse(path: &str) -> Route {
        let segments: Vec<&str> = path
            .trim()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["players"] => Route::Players,
            ["players", id] => guard_player_id(Some(*id)),
            ["compare"] => Route::Compare,
            _ => Route::NotFound,
        }
    }
}

/// Detail-route guard: a missing or blank id goes to the not-found view.
pub fn guard_player_id(raw: Option<&str>) -> Route {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => Route::PlayerDetail(PlayerKey::from(id)),
        _ => Route::NotFound,
    }
}

/// State of the player detail screen.
#[derive(Debug, Clone)]
pub struct DetailView {
    id: PlayerKey,
    player: Option<Player>,
    loading: bool,
    error: Option<String>,
    redirect_at: Option<Instant>,
}

impl DetailView {
    /// Starts loading `id`; the caller issues the query.
    pub fn begin(id: PlayerKey) -> Self {
        Self {
            id,
            player: None,
            loading: true,
            error: None,
            redirect_at: None,
        }
    }

    pub fn id(&self) -> &PlayerKey {
        &self.id
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply(&mut self, result: Result<Player, CatalogueError>, now: Instant) {
        self.loading = false;
        match result {
            Ok(player) => {
                self.player = Some(player);
                self.error = None;
                self.redirect_at = None;
            }
            Err(err) => {
                self.player = None;
                self.error = Some(err.to_string());
                self.redirect_at = Some(now + NOT_FOUND_REDIRECT_DELAY);
            }
        }
    }

    pub fn should_redirect(&self, now: Instant) -> bool {
        self.redirect_at.is_some_and(|at| now >= at)
    }
}

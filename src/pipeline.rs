use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::activity_log::ActivityLog;
use crate::catalogue::{locale_cmp, matches_search};
use crate::error::CatalogueError;
use crate::history::SearchHistoryStore;
use crate::model::{PageMeta, Player, PlayerKey, PlayerPage};

pub const MAX_COMPARE: usize = 3;
pub const MIN_COMPARE: usize = 2;
const PAGE_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Team,
    Position,
    Nationality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &Player, b: &Player) -> Ordering {
        let ord = match self.field {
            SortField::Name => locale_cmp(&a.name, &b.name),
            SortField::Team => locale_cmp(&a.team, &b.team),
            SortField::Position => locale_cmp(
                a.position.as_deref().unwrap_or_default(),
                b.position.as_deref().unwrap_or_default(),
            ),
            SortField::Nationality => locale_cmp(
                a.nationality.as_deref().unwrap_or_default(),
                b.nationality.as_deref().unwrap_or_default(),
            ),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }

    pub fn apply(&self, players: &mut [Player]) {
        players.sort_by(|a, b| self.compare(a, b));
    }

    /// Name asc, name desc, team asc, ... nationality desc, then back.
    pub fn cycle(self) -> Self {
        use SortDirection::*;
        use SortField::*;
        match (self.field, self.direction) {
            (field, Ascending) => Self::new(field, Descending),
            (Name, Descending) => Self::new(Team, Ascending),
            (Team, Descending) => Self::new(Position, Ascending),
            (Position, Descending) => Self::new(Nationality, Ascending),
            (Nationality, Descending) => Self::new(Name, Ascending),
        }
    }

    pub fn label(&self) -> String {
        let field = match self.field {
            SortField::Name => "name",
            SortField::Team => "team",
            SortField::Position => "position",
            SortField::Nationality => "nationality",
        };
        let arrow = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        format!("{field} {arrow}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Replace,
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub generation: u64,
    pub page: u32,
    pub per_page: usize,
    pub search: Option<String>,
    pub mode: LoadMode,
}

#[derive(Debug, Clone)]
pub struct PageResponse {
    pub request: PageRequest,
    pub result: Result<PlayerPage, CatalogueError>,
}

/// Emits the latest input once it has been stable for the quiet period,
/// skipping values equal to the previous emission.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
    last_emitted: String,
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_emitted: String::new(),
        }
    }

    pub fn on_input(&mut self, value: &str, now: Instant) {
        self.pending = Some((value.to_string(), now));
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|(_, at)| now.saturating_duration_since(*at) >= self.quiet);
        if !due {
            return None;
        }
        self.flush()
    }

    /// Emits the pending value immediately, if it differs from the last one.
    pub fn flush(&mut self) -> Option<String> {
        let (value, _) = self.pending.take()?;
        if value == self.last_emitted {
            return None;
        }
        self.last_emitted = value.clone();
        Some(value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Fires once each time the watched sentinel's visible fraction rises to the
/// threshold; re-arms when it drops back below.
#[derive(Debug, Clone)]
pub struct ProximityTrigger {
    threshold: f32,
    armed: bool,
}

impl ProximityTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            armed: true,
        }
    }

    pub fn observe(&mut self, visible_fraction: f32, on_cross: impl FnOnce()) -> bool {
        if visible_fraction >= self.threshold && visible_fraction > 0.0 {
            if self.armed {
                self.armed = false;
                on_cross();
                return true;
            }
        } else {
            self.armed = true;
        }
        false
    }

    pub fn rearm(&mut self) {
        self.armed = true;
    }
}

/// Up to [`MAX_COMPARE`] players picked for side-by-side comparison.
#[derive(Debug, Clone, Default)]
pub struct CompareSelection {
    selected: Vec<Player>,
}

impl CompareSelection {
    /// Returns true when membership changed. Adding past the limit is ignored.
    pub fn toggle(&mut self, player: &Player) -> bool {
        if let Some(pos) = self.selected.iter().position(|p| p.id == player.id) {
            self.selected.remove(pos);
            return true;
        }
        if self.selected.len() >= MAX_COMPARE {
            return false;
        }
        self.selected.push(player.clone());
        true
    }

    pub fn contains(&self, id: impl Into<PlayerKey>) -> bool {
        let key = id.into();
        self.selected.iter().any(|p| p.id == key.as_str())
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn can_compare(&self) -> bool {
        self.selected.len() >= MIN_COMPARE
    }

    pub fn players(&self) -> &[Player] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// Per-view query state for the player list.
///
/// The view-model never performs IO: operations return a [`PageRequest`]
/// for the caller to run, and results come back through
/// [`ListViewModel::apply_response`]. Each request carries a generation
/// number and only the newest generation's response is applied.
#[derive(Debug)]
pub struct ListViewModel {
    per_page: usize,
    search_input: String,
    active_search: String,
    sort: Option<SortOrder>,
    favorites_only: bool,
    items: Vec<Player>,
    meta: PageMeta,
    loading: bool,
    loading_more: bool,
    error: Option<String>,
    generation: u64,
    debouncer: SearchDebouncer,
    selection: CompareSelection,
    log: ActivityLog,
}

impl ListViewModel {
    pub fn new(per_page: usize, debounce: Duration, log: ActivityLog) -> Self {
        let per_page = per_page.max(1);
        Self {
            per_page,
            search_input: String::new(),
            active_search: String::new(),
            sort: None,
            favorites_only: false,
            items: Vec::new(),
            meta: PageMeta::for_count(0, 1, per_page),
            loading: false,
            loading_more: false,
            error: None,
            generation: 0,
            debouncer: SearchDebouncer::new(debounce),
            selection: CompareSelection::default(),
            log,
        }
    }

    pub fn items(&self) -> &[Player] {
        &self.items
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn current_page(&self) -> u32 {
        self.meta.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.meta.total_pages
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn active_search(&self) -> &str {
        &self.active_search
    }

    pub fn sort(&self) -> Option<SortOrder> {
        self.sort
    }

    pub fn is_favorites_only(&self) -> bool {
        self.favorites_only
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_more(&self) -> bool {
        !self.favorites_only && self.meta.next_page.is_some()
    }

    pub fn initial_request(&mut self) -> PageRequest {
        self.replace_request(1)
    }

    pub fn on_search_input(&mut self, text: &str, now: Instant) {
        self.search_input = text.to_string();
        self.debouncer.on_input(text, now);
    }

    pub fn clear_search(&mut self, now: Instant) {
        self.on_search_input("", now);
    }

    /// Call on every tick; returns a request once the debounced input settles.
    pub fn poll_search(&mut self, now: Instant, favorites: &[Player]) -> Option<PageRequest> {
        let term = self.debouncer.poll(now)?;
        self.apply_search(term, favorites)
    }

    /// Explicit submission: records the term in history and skips the quiet
    /// period.
    pub fn submit_search(
        &mut self,
        history: &mut SearchHistoryStore,
        favorites: &[Player],
    ) -> Option<PageRequest> {
        history.add_search(&self.search_input);
        let term = self.debouncer.flush()?;
        self.apply_search(term, favorites)
    }

    pub fn use_history_term(
        &mut self,
        term: &str,
        now: Instant,
        history: &mut SearchHistoryStore,
        favorites: &[Player],
    ) -> Option<PageRequest> {
        self.on_search_input(term, now);
        self.submit_search(history, favorites)
    }

    fn apply_search(&mut self, term: String, favorites: &[Player]) -> Option<PageRequest> {
        self.log.info(format!("Search: '{term}'"));
        self.active_search = term;
        if self.favorites_only {
            self.show_favorites(favorites);
            return None;
        }
        Some(self.replace_request(1))
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        self.sort = Some(order);
        order.apply(&mut self.items);
    }

    pub fn cycle_sort(&mut self) -> SortOrder {
        let next = self
            .sort
            .map(SortOrder::cycle)
            .unwrap_or(SortOrder::new(SortField::Name, SortDirection::Ascending));
        self.set_sort(next);
        next
    }

    pub fn go_to_page(&mut self, page: u32) -> Option<PageRequest> {
        if self.favorites_only
            || page < 1
            || page > self.meta.total_pages
            || page == self.meta.current_page
        {
            return None;
        }
        Some(self.replace_request(page))
    }

    pub fn next_page(&mut self) -> Option<PageRequest> {
        self.go_to_page(self.meta.current_page.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> Option<PageRequest> {
        if self.meta.current_page <= 1 {
            return None;
        }
        self.go_to_page(self.meta.current_page - 1)
    }

    /// Infinite-scroll step: fetches the next page and appends it.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.favorites_only || self.loading || self.loading_more {
            return None;
        }
        let next = self.meta.next_page?;
        self.generation += 1;
        self.loading_more = true;
        Some(PageRequest {
            generation: self.generation,
            page: next,
            per_page: self.per_page,
            search: self.search_term(),
            mode: LoadMode::Append,
        })
    }

    pub fn set_favorites_only(
        &mut self,
        enabled: bool,
        favorites: &[Player],
    ) -> Option<PageRequest> {
        if self.favorites_only == enabled {
            return None;
        }
        self.favorites_only = enabled;
        if enabled {
            // Drop anything in flight from the catalogue.
            self.generation += 1;
            self.show_favorites(favorites);
            None
        } else {
            Some(self.replace_request(1))
        }
    }

    /// Re-derives the list after the favorites set changed.
    pub fn refresh_favorites(&mut self, favorites: &[Player]) {
        if self.favorites_only {
            self.show_favorites(favorites);
        }
    }

    fn show_favorites(&mut self, favorites: &[Player]) {
        self.items = favorites
            .iter()
            .filter(|p| matches_search(p, &self.active_search))
            .cloned()
            .collect();
        if let Some(order) = self.sort {
            order.apply(&mut self.items);
        }
        self.meta = PageMeta {
            total_pages: 1,
            current_page: 1,
            next_page: None,
            per_page: self.items.len(),
            total_count: self.items.len(),
        };
        self.loading = false;
        self.loading_more = false;
        self.error = None;
    }

    /// Applies a finished request. Returns false when the response belongs
    /// to a superseded request and was dropped.
    pub fn apply_response(&mut self, response: PageResponse) -> bool {
        let PageResponse { request, result } = response;
        if request.generation != self.generation {
            self.log.info(format!(
                "Dropped stale page {} (generation {} < {})",
                request.page, request.generation, self.generation
            ));
            return false;
        }
        self.loading = false;
        self.loading_more = false;

        match result {
            Ok(page) => {
                self.error = None;
                match request.mode {
                    LoadMode::Replace => self.items = page.data,
                    LoadMode::Append => {
                        let mut seen: HashSet<String> =
                            self.items.iter().map(|p| p.id.clone()).collect();
                        self.items
                            .extend(page.data.into_iter().filter(|p| seen.insert(p.id.clone())));
                    }
                }
                if let Some(order) = self.sort {
                    order.apply(&mut self.items);
                }
                self.meta = page.meta;
            }
            Err(err) => {
                self.log.error(format!("Player query failed: {err}"));
                self.error = Some(err.to_string());
                if request.mode == LoadMode::Replace {
                    self.items.clear();
                    self.meta = PageMeta::for_count(0, 1, self.per_page);
                }
            }
        }
        true
    }

    /// Up to five page numbers around the current page.
    pub fn page_numbers(&self) -> Vec<u32> {
        let total = self.meta.total_pages;
        if total == 0 {
            return Vec::new();
        }
        let current = self.meta.current_page;
        let mut start = current.saturating_sub(2).max(1);
        let end = (start + PAGE_WINDOW - 1).min(total);
        if end - start < PAGE_WINDOW - 1 {
            start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
        }
        (start..=end).collect()
    }

    pub fn toggle_selection(&mut self, player: &Player) -> bool {
        self.selection.toggle(player)
    }

    pub fn selection(&self) -> &CompareSelection {
        &self.selection
    }

    pub fn can_compare(&self) -> bool {
        self.selection.can_compare()
    }

    /// Players handed to the compare view; `None` until two are selected.
    pub fn compare_handoff(&self) -> Option<Vec<Player>> {
        self.can_compare()
            .then(|| self.selection.players().to_vec())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn replace_request(&mut self, page: u32) -> PageRequest {
        self.generation += 1;
        self.loading = true;
        self.loading_more = false;
        self.error = None;
        PageRequest {
            generation: self.generation,
            page,
            per_page: self.per_page,
            search: self.search_term(),
            mode: LoadMode::Replace,
        }
    }

    fn search_term(&self) -> Option<String> {
        let trimmed = self.active_search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use crate::activity_log::ActivityLog;
use crate::error::CatalogueError;
use crate::model::{PageMeta, Player, PlayerKey, PlayerPage, Team};
use crate::sources::{PlayerSource, TeamSource};

/// Fetch-once, in-memory player catalogue.
///
/// The first query loads the whole collection from the primary source,
/// falling back to the secondary one; concurrent callers block on that
/// single load and share its result. A successful load is kept for the
/// lifetime of the value. A failed load is not memoized, so the next query
/// tries again.
pub struct PlayerCatalogue {
    primary: Option<Box<dyn PlayerSource>>,
    fallback: Box<dyn PlayerSource>,
    teams_source: Option<Box<dyn TeamSource>>,
    players: OnceCell<Arc<Vec<Player>>>,
    teams: OnceCell<Arc<Vec<Team>>>,
    rosters: Mutex<HashMap<String, Arc<Vec<Player>>>>,
    log: ActivityLog,
}

impl PlayerCatalogue {
    pub fn new(
        primary: Option<Box<dyn PlayerSource>>,
        fallback: Box<dyn PlayerSource>,
        log: ActivityLog,
    ) -> Self {
        Self {
            primary,
            fallback,
            teams_source: None,
            players: OnceCell::new(),
            teams: OnceCell::new(),
            rosters: Mutex::new(HashMap::new()),
            log,
        }
    }

    pub fn with_team_source(mut self, source: Box<dyn TeamSource>) -> Self {
        self.teams_source = Some(source);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.players.get().is_some()
    }

    /// Full catalogue, loading it on first use.
    pub fn all_players(&self) -> Result<Arc<Vec<Player>>, CatalogueError> {
        self.players
            .get_or_try_init(|| self.load_players().map(Arc::new))
            .cloned()
    }

    pub fn get_players(
        &self,
        page: u32,
        search: Option<&str>,
        per_page: usize,
    ) -> Result<PlayerPage, CatalogueError> {
        let all = self.all_players()?;
        Ok(query_page(&all, page, search, per_page))
    }

    pub fn get_player_by_id(&self, id: impl Into<PlayerKey>) -> Result<Player, CatalogueError> {
        let key = id.into();
        let all = self.all_players()?;
        all.iter()
            .find(|p| p.id == key.as_str())
            .cloned()
            .ok_or_else(|| CatalogueError::NotFound {
                id: key.to_string(),
            })
    }

    pub fn get_teams(&self) -> Result<Arc<Vec<Team>>, CatalogueError> {
        let Some(source) = self.teams_source.as_ref() else {
            return Ok(Arc::new(Vec::new()));
        };
        self.teams
            .get_or_try_init(|| {
                let teams = source.fetch_teams().inspect_err(|err| {
                    self.log.warn(format!("Teams fetch failed: {err}"));
                })?;
                self.log.info(format!("Teams fetched: {}", teams.len()));
                Ok(Arc::new(teams))
            })
            .cloned()
    }

    pub fn get_players_by_team(&self, team_id: &str) -> Result<Arc<Vec<Player>>, CatalogueError> {
        let Some(source) = self.teams_source.as_ref() else {
            return Ok(Arc::new(Vec::new()));
        };
        let team_id = team_id.trim().to_string();
        if let Some(cached) = self
            .rosters
            .lock()
            .ok()
            .and_then(|r| r.get(&team_id).cloned())
        {
            return Ok(cached);
        }
        let roster = source.fetch_roster(&team_id).inspect_err(|err| {
            self.log
                .warn(format!("Roster fetch failed for team {team_id}: {err}"));
        })?;
        self.log
            .info(format!("Roster for team {team_id}: {} players", roster.len()));
        let roster = Arc::new(roster);
        if let Ok(mut rosters) = self.rosters.lock() {
            rosters.insert(team_id, Arc::clone(&roster));
        }
        Ok(roster)
    }

    fn load_players(&self) -> Result<Vec<Player>, CatalogueError> {
        if let Some(primary) = self.primary.as_ref() {
            self.log
                .info(format!("Fetching player catalogue from {}", primary.name()));
            match primary.fetch_players() {
                Ok(players) if !players.is_empty() => {
                    self.log.info(format!("Catalogue loaded: {} players", players.len()));
                    return Ok(players);
                }
                Ok(_) => self
                    .log
                    .warn("Primary source returned no players, using fallback"),
                Err(err) => self
                    .log
                    .warn(format!("Primary source failed ({err}), using fallback")),
            }
        }

        match self.fallback.fetch_players() {
            Ok(players) => {
                self.log.info(format!(
                    "Catalogue loaded from {}: {} players",
                    self.fallback.name(),
                    players.len()
                ));
                Ok(players)
            }
            Err(err) => {
                self.log.error(format!("Fallback source failed: {err}"));
                Err(CatalogueError::Unavailable(err.to_string()))
            }
        }
    }
}

/// Filter by `search`, sort by name, then slice out `page` (1-based).
pub fn query_page(all: &[Player], page: u32, search: Option<&str>, per_page: usize) -> PlayerPage {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let mut filtered = filter_players(all, search);
    filtered.sort_by_cached_key(|p| (fold(&p.name), p.name.clone()));

    let meta = PageMeta::for_count(filtered.len(), page, per_page);
    let start = (page as usize - 1).saturating_mul(per_page);
    let data = filtered
        .into_iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();
    PlayerPage { data, meta }
}

pub fn filter_players<'a>(all: &'a [Player], search: Option<&str>) -> Vec<&'a Player> {
    let term = search.map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return all.iter().collect();
    }
    let needle = fold(term);
    all.iter().filter(|p| matches_folded(p, &needle)).collect()
}

/// Case-insensitive substring match on name, team, or position.
pub fn matches_search(player: &Player, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    matches_folded(player, &fold(term))
}

fn matches_folded(player: &Player, needle: &str) -> bool {
    fold(&player.name).contains(needle)
        || fold(&player.team).contains(needle)
        || player
            .position
            .as_deref()
            .is_some_and(|pos| fold(pos).contains(needle))
}

/// Locale-style ordering: accents and case are ignored first, raw text
/// breaks ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => 'e',
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => 'i',
        'ķ' => 'k',
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
        'ñ' | 'ń' | 'ņ' | 'ň' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => 'o',
        'ŕ' | 'ŗ' | 'ř' => 'r',
        'ś' | 'ŝ' | 'ş' | 'š' => 's',
        'ţ' | 'ť' | 'ŧ' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CatalogueError;
use crate::http_client::http_client;
use crate::model::{Player, Team};

const BUNDLED_PLAYERS_JSON: &str = include_str!("../data/players.json");
const BASKETBALL: &str = "Basketball";

/// Where the full player collection comes from.
pub trait PlayerSource: Send + Sync {
    fn name(&self) -> &str;
    fn fetch_players(&self) -> Result<Vec<Player>, CatalogueError>;
}

/// Team listing and per-team rosters.
pub trait TeamSource: Send + Sync {
    fn fetch_teams(&self) -> Result<Vec<Team>, CatalogueError>;
    fn fetch_roster(&self, team_id: &str) -> Result<Vec<Player>, CatalogueError>;
}

pub struct HttpPlayerSource {
    url: String,
}

impl HttpPlayerSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl PlayerSource for HttpPlayerSource {
    fn name(&self) -> &str {
        &self.url
    }

    fn fetch_players(&self) -> Result<Vec<Player>, CatalogueError> {
        let body = fetch_text(&self.url)?;
        parse_players_json(&body)
    }
}

/// The static dataset compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledPlayerSource;

impl PlayerSource for BundledPlayerSource {
    fn name(&self) -> &str {
        "bundled"
    }

    fn fetch_players(&self) -> Result<Vec<Player>, CatalogueError> {
        parse_players_json(BUNDLED_PLAYERS_JSON)
    }
}

pub struct HttpTeamSource {
    api_url: String,
}

impl HttpTeamSource {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl TeamSource for HttpTeamSource {
    fn fetch_teams(&self) -> Result<Vec<Team>, CatalogueError> {
        let url = format!("{}/search_all_teams.php?l=NBA", self.api_url);
        let body = fetch_text(&url)?;
        parse_teams_json(&body)
    }

    fn fetch_roster(&self, team_id: &str) -> Result<Vec<Player>, CatalogueError> {
        let url = format!(
            "{}/lookup_all_players.php?id={}",
            self.api_url,
            team_id.trim()
        );
        let body = fetch_text(&url)?;
        parse_players_json(&body)
    }
}

fn fetch_text(url: &str) -> Result<String, CatalogueError> {
    let client = http_client().map_err(|err| CatalogueError::Network(format!("{err:#}")))?;
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(CatalogueError::Http {
            status: status.as_u16(),
        });
    }
    Ok(resp.text()?)
}

const ENVELOPE_KEYS: [&str; 4] = ["player", "players", "teams", "team"];

// Decodes record by record; entries that do not fit `T` are skipped.
fn parse_collection<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, CatalogueError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value =
        serde_json::from_str(trimmed).map_err(|err| CatalogueError::Decode(err.to_string()))?;
    let list = match &value {
        Value::Array(list) => Some(list),
        Value::Object(map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array)),
        Value::Null => None,
        _ => {
            return Err(CatalogueError::Decode(
                "expected an array or an object envelope".to_string(),
            ));
        }
    };
    let Some(list) = list else {
        return Ok(Vec::new());
    };
    Ok(list
        .iter()
        .filter_map(|entry| serde_json::from_value::<T>(entry.clone()).ok())
        .collect())
}

/// Accepts a flat array or an upstream `{"player": [...]}` envelope.
/// Records with a non-basketball sport are dropped.
pub fn parse_players_json(raw: &str) -> Result<Vec<Player>, CatalogueError> {
    let players: Vec<Player> = parse_collection(raw)?;
    Ok(players
        .into_iter()
        .filter(|p| !p.id.trim().is_empty())
        .filter(|p| p.sport.is_empty() || p.sport.eq_ignore_ascii_case(BASKETBALL))
        .collect())
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<Team>, CatalogueError> {
    parse_collection(raw)
}

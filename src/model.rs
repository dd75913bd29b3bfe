use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// One player record, as served by the sports-data API.
///
/// Field names on the wire follow the upstream API so that stored favorites
/// and the bundled dataset share a single format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "idPlayer", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "strPlayer")]
    pub name: String,
    #[serde(rename = "strTeam", default, deserialize_with = "null_as_empty")]
    pub team: String,
    #[serde(rename = "strSport", default, deserialize_with = "null_as_empty")]
    pub sport: String,
    #[serde(rename = "strPosition", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(rename = "strNationality", default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(rename = "strHeight", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(rename = "strWeight", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(
        rename = "strThumb",
        alias = "strCutout",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<String>,
    #[serde(rename = "dateBorn", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "strNumber", default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<String>,
    #[serde(rename = "idTeam", default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
}

impl Player {
    pub fn key(&self) -> PlayerKey {
        PlayerKey(self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "idTeam", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "strTeam")]
    pub name: String,
    #[serde(rename = "strTeamShort", default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(rename = "strSport", default, deserialize_with = "null_as_empty")]
    pub sport: String,
    #[serde(rename = "strLeague", default, deserialize_with = "null_as_empty")]
    pub league: String,
    #[serde(rename = "strStadium", default, skip_serializing_if = "Option::is_none")]
    pub stadium: Option<String>,
    #[serde(rename = "strLocation", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "intFormedYear", default, skip_serializing_if = "Option::is_none")]
    pub formed_year: Option<String>,
}

/// Player identity normalized to its string form.
///
/// Callers may hold ids as text or as numbers; both compare equal once
/// normalized (`134060` and `"134060"` are the same player).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerKey(String);

impl PlayerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for PlayerKey {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<u32> for PlayerKey {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for PlayerKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<&Player> for PlayerKey {
    fn from(value: &Player) -> Self {
        value.key()
    }
}

impl From<&PlayerKey> for PlayerKey {
    fn from(value: &PlayerKey) -> Self {
        value.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub total_pages: u32,
    pub current_page: u32,
    pub next_page: Option<u32>,
    pub per_page: usize,
    pub total_count: usize,
}

impl PageMeta {
    pub fn for_count(total_count: usize, page: u32, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total_count.div_ceil(per_page) as u32;
        Self {
            total_pages,
            current_page: page,
            next_page: (page < total_pages).then_some(page + 1),
            per_page,
            total_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerPage {
    pub data: Vec<Player>,
    pub meta: PageMeta,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

// Upstream sends `null` for unknown text fields.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

use chrono::{Datelike, NaiveDate};

use crate::model::Player;
use crate::pipeline::{MAX_COMPARE, MIN_COMPARE};

const MISSING: &str = "N/A";
const DEFAULT_NATIONALITY: &str = "USA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareField {
    Height,
    Weight,
    Position,
    Team,
    Nationality,
    Age,
}

impl CompareField {
    pub const ALL: [CompareField; 6] = [
        CompareField::Height,
        CompareField::Weight,
        CompareField::Position,
        CompareField::Team,
        CompareField::Nationality,
        CompareField::Age,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CompareField::Height => "Height",
            CompareField::Weight => "Weight",
            CompareField::Position => "Position",
            CompareField::Team => "Team",
            CompareField::Nationality => "Nationality",
            CompareField::Age => "Age",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonCell {
    pub player_id: String,
    pub player_name: String,
    pub value: String,
}

/// Side-by-side view of the players handed over from the list.
#[derive(Debug, Clone, Default)]
pub struct CompareView {
    players: Vec<Player>,
}

impl CompareView {
    pub fn from_handoff(mut players: Vec<Player>) -> Self {
        players.truncate(MAX_COMPARE);
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn remove(&mut self, index: usize) -> Option<Player> {
        (index < self.players.len()).then(|| self.players.remove(index))
    }

    pub fn can_compare(&self) -> bool {
        self.players.len() >= MIN_COMPARE
    }

    pub fn comparison(&self, field: CompareField, today: NaiveDate) -> Vec<ComparisonCell> {
        if !self.can_compare() {
            return Vec::new();
        }
        self.players
            .iter()
            .map(|p| ComparisonCell {
                player_id: p.id.clone(),
                player_name: p.name.clone(),
                value: field_value(p, field, today),
            })
            .collect()
    }
}

fn field_value(player: &Player, field: CompareField, today: NaiveDate) -> String {
    let text = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISSING)
            .to_string()
    };
    match field {
        CompareField::Height => text(&player.height),
        CompareField::Weight => text(&player.weight),
        CompareField::Position => text(&player.position),
        CompareField::Team => {
            if player.team.trim().is_empty() {
                MISSING.to_string()
            } else {
                player.team.clone()
            }
        }
        CompareField::Nationality => player
            .nationality
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_NATIONALITY)
            .to_string(),
        CompareField::Age => player
            .birth_date
            .as_deref()
            .and_then(birth_year)
            .map(|year| (today.year() - year).to_string())
            .unwrap_or_else(|| MISSING.to_string()),
    }
}

fn birth_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.year());
    }
    raw.get(..4)?.parse().ok()
}

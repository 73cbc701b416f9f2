use serde::{Deserialize, Serialize};

/// The closed set of numeric fields a player-statistics record carries.
/// `STAT_FIELDS` is the single source of truth for ordering; the first entry
/// doubles as the fallback whenever a selection cannot be honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    Kills,
    Deaths,
    Assists,
    Wins,
    Score,
}

pub const STAT_FIELDS: [StatField; 5] = [
    StatField::Kills,
    StatField::Deaths,
    StatField::Assists,
    StatField::Wins,
    StatField::Score,
];

pub fn stat_label(field: StatField) -> &'static str {
    match field {
        StatField::Kills => "Kills",
        StatField::Deaths => "Deaths",
        StatField::Assists => "Assists",
        StatField::Wins => "Wins",
        StatField::Score => "Score",
    }
}

impl StatField {
    pub fn key(self) -> &'static str {
        match self {
            StatField::Kills => "kills",
            StatField::Deaths => "deaths",
            StatField::Assists => "assists",
            StatField::Wins => "wins",
            StatField::Score => "score",
        }
    }

    /// Resolve a wire/config key to a field. Unknown keys fold to the first
    /// registry field instead of failing.
    pub fn from_key(raw: &str) -> StatField {
        let trimmed = raw.trim();
        STAT_FIELDS
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(trimmed))
            .unwrap_or(STAT_FIELDS[0])
    }

    pub fn next(self) -> StatField {
        let pos = STAT_FIELDS
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0);
        STAT_FIELDS[(pos + 1) % STAT_FIELDS.len()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub kills: f64,
    pub deaths: f64,
    pub assists: f64,
    pub wins: f64,
    pub score: f64,
}

impl Stats {
    pub fn value(&self, field: StatField) -> f64 {
        match field {
            StatField::Kills => self.kills,
            StatField::Deaths => self.deaths,
            StatField::Assists => self.assists,
            StatField::Wins => self.wins,
            StatField::Score => self.score,
        }
    }
}

/// One player's aggregated statistics, superseded wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename = "playerName")]
    pub username: String,
    #[serde(default)]
    pub stats: Stats,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Independent rating systems tracked per team and season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSystem {
    /// Elo-class rating updated game by game
    Elo,
    /// Composite power index
    PowerIndex,
    /// Proprietary poll/computer ranking
    Ranking,
    /// Advanced efficiency metric
    Efficiency,
    StrengthOfSchedule,
}

impl RatingSystem {
    pub const ALL: [RatingSystem; 5] = [
        RatingSystem::Elo,
        RatingSystem::PowerIndex,
        RatingSystem::Ranking,
        RatingSystem::Efficiency,
        RatingSystem::StrengthOfSchedule,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingSystem::Elo => "elo",
            RatingSystem::PowerIndex => "power_index",
            RatingSystem::Ranking => "ranking",
            RatingSystem::Efficiency => "efficiency",
            RatingSystem::StrengthOfSchedule => "strength_of_schedule",
        }
    }
}

impl fmt::Display for RatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingSystem::ALL
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown rating system '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub abbreviation: Option<String>,
    pub conference: Option<String>,
    pub division: Option<String>,
    pub color: Option<String>,
    pub alt_color: Option<String>,
    pub logo_url: Option<String>,
}

/// Team as supplied by the administrative import, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub alt_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Alternate spellings, provider-agnostic
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl NewTeam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub team_id: TeamId,
    pub alias: String,
    /// Provider tag, empty for aliases valid for every source
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub external_id: Option<String>,
    pub season: i32,
    pub week: Option<u32>,
    pub game_date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub completed: bool,
    pub venue: Option<String>,
}

impl Game {
    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    pub fn final_score(&self) -> Option<(i64, i64)> {
        match (self.completed, self.home_score, self.away_score) {
            (true, Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// Observed game fields. `None` means "not observed": the stored value is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameUpsert {
    pub season: i32,
    pub game_date: NaiveDate,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub external_id: Option<String>,
    pub week: Option<u32>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub completed: Option<bool>,
    pub venue: Option<String>,
}

impl GameUpsert {
    pub fn new(season: i32, game_date: NaiveDate, home: TeamId, away: TeamId) -> Self {
        Self {
            season,
            game_date,
            home_team_id: home,
            away_team_id: away,
            external_id: None,
            week: None,
            home_score: None,
            away_score: None,
            completed: None,
            venue: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameFilter {
    pub season: Option<i32>,
    pub week: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub team_id: Option<TeamId>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub team_id: TeamId,
    pub system: RatingSystem,
    pub season: i32,
    /// `None` for a season-level value
    pub week: Option<u32>,
    pub value: f64,
    pub offense: Option<f64>,
    pub defense: Option<f64>,
    pub rank: Option<u32>,
    /// System-specific extra fields
    pub extra: Option<serde_json::Value>,
}

impl RatingSnapshot {
    pub fn new(team_id: TeamId, system: RatingSystem, season: i32, value: f64) -> Self {
        Self {
            team_id,
            system,
            season,
            week: None,
            value,
            offense: None,
            defense: None,
            rank: None,
            extra: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingFilter {
    pub team_id: Option<TeamId>,
    pub system: Option<RatingSystem>,
    pub season: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGameStatLine {
    pub team_id: TeamId,
    pub game_id: GameId,
    pub game_date: NaiveDate,
    pub opponent_team_id: Option<TeamId>,
    pub metrics: BTreeMap<String, f64>,
}

impl RecentGameStatLine {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Favorite {
    Home,
    Away,
    /// Exactly even: no favorite declared
    Push,
}

impl Favorite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Favorite::Home => "home",
            Favorite::Away => "away",
            Favorite::Push => "push",
        }
    }
}

impl FromStr for Favorite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Favorite::Home),
            "away" => Ok(Favorite::Away),
            "push" => Ok(Favorite::Push),
            other => Err(format!("unknown favorite '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypotheticalPrediction {
    pub game_id: GameId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_rating_a: f64,
    pub away_rating_a: f64,
    pub home_rating_b: f64,
    pub away_rating_b: f64,
    pub home_win_probability: f64,
    /// Expected home margin in points; negative when the away side is favored
    pub spread: f64,
    pub favored: Favorite,
    pub favored_team_id: Option<TeamId>,
    /// Set once the game is final; `None` while pending or for a push/tie
    pub correct: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

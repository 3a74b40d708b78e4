use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{WireTeam, lenient_i64, parse_event_date};

/// Top-level scoreboard payload. Events stay raw so a single malformed event
/// can be skipped without failing the whole day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardResponse {
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreboardEvent {
    pub id: Option<String>,
    pub date: Option<String>,
    #[serde(default)]
    pub season: Option<SeasonRef>,
    #[serde(default)]
    pub week: Option<WeekRef>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonRef {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeekRef {
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Venue {
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Status {
    #[serde(rename = "type", default)]
    pub status_type: Option<StatusType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusType {
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Competitor {
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub team: WireTeam,
}

/// One scoreboard game with every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreboardRecord {
    pub external_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub season: Option<i32>,
    pub week: Option<u32>,
    pub completed: Option<bool>,
    pub home_name: Option<String>,
    pub away_name: Option<String>,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub venue: Option<String>,
}

impl From<ScoreboardEvent> for ScoreboardRecord {
    fn from(event: ScoreboardEvent) -> Self {
        let mut record = ScoreboardRecord {
            external_id: event.id,
            date: event.date.as_deref().and_then(parse_event_date),
            season: event.season.and_then(|s| s.year),
            week: event.week.and_then(|w| w.number),
            ..Default::default()
        };

        let Some(competition) = event.competitions.into_iter().next() else {
            return record;
        };

        record.venue = competition.venue.and_then(|v| v.full_name);
        record.completed = competition
            .status
            .and_then(|s| s.status_type)
            .and_then(|t| t.completed);

        for competitor in competition.competitors {
            let name = competitor.team.best_name();
            let score = lenient_i64(&competitor.score);
            match competitor.home_away.as_deref() {
                Some("home") => {
                    record.home_name = name;
                    record.home_score = score;
                }
                Some("away") => {
                    record.away_name = name;
                    record.away_score = score;
                }
                _ => {}
            }
        }

        record
    }
}

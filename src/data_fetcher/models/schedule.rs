use chrono::NaiveDate;
use serde::Serialize;

/// One row of an HTML schedule table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleRecord {
    pub date: Option<NaiveDate>,
    pub away_name: Option<String>,
    pub home_name: Option<String>,
    pub away_score: Option<i64>,
    pub home_score: Option<i64>,
}

impl ScheduleRecord {
    /// Both scores present means the game has been played
    pub fn is_final(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }
}

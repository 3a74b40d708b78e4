use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{lenient_f64, lenient_i64};

/// One row of an HTML rating table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingRecord {
    pub team_name: Option<String>,
    pub rank: Option<u32>,
    pub value: Option<f64>,
    pub offense: Option<f64>,
    pub defense: Option<f64>,
}

/// One page of the advanced ratings API
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingsApiPage {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(rename = "pageCount", default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingsApiEntry {
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub efficiency: Value,
    #[serde(rename = "efficiencyOffense", default)]
    pub efficiency_offense: Value,
    #[serde(rename = "efficiencyDefense", default)]
    pub efficiency_defense: Value,
    #[serde(rename = "efficiencyRank", default)]
    pub efficiency_rank: Value,
    #[serde(rename = "strengthOfSchedule", default)]
    pub strength_of_schedule: Value,
    #[serde(rename = "strengthOfScheduleRank", default)]
    pub strength_of_schedule_rank: Value,
}

/// Per-team efficiency and strength-of-schedule values from the ratings API
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AdvancedRatingRecord {
    pub team_name: Option<String>,
    pub efficiency: Option<f64>,
    pub efficiency_offense: Option<f64>,
    pub efficiency_defense: Option<f64>,
    pub efficiency_rank: Option<u32>,
    pub strength_of_schedule: Option<f64>,
    pub strength_of_schedule_rank: Option<u32>,
}

fn rank(value: &Value) -> Option<u32> {
    lenient_i64(value).and_then(|r| u32::try_from(r).ok())
}

impl From<RatingsApiEntry> for AdvancedRatingRecord {
    fn from(entry: RatingsApiEntry) -> Self {
        Self {
            team_name: entry
                .team
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            efficiency: lenient_f64(&entry.efficiency),
            efficiency_offense: lenient_f64(&entry.efficiency_offense),
            efficiency_defense: lenient_f64(&entry.efficiency_defense),
            efficiency_rank: rank(&entry.efficiency_rank),
            strength_of_schedule: lenient_f64(&entry.strength_of_schedule),
            strength_of_schedule_rank: rank(&entry.strength_of_schedule_rank),
        }
    }
}

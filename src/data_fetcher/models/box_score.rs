use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::common::{WireTeam, lenient_f64, lenient_i64, parse_event_date};

/// Box score `summary` document: event header plus per-team statistics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoxScoreSummary {
    #[serde(default)]
    pub header: Option<SummaryHeader>,
    #[serde(default)]
    pub boxscore: Option<SummaryBoxscore>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryHeader {
    pub id: Option<String>,
    #[serde(default)]
    pub competitions: Vec<HeaderCompetition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeaderCompetition {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryBoxscore {
    #[serde(default)]
    pub teams: Vec<SummaryTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryTeam {
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    #[serde(default)]
    pub team: WireTeam,
    #[serde(default)]
    pub statistics: Vec<SummaryStatistic>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryStatistic {
    pub name: Option<String>,
    #[serde(rename = "displayValue", default)]
    pub display_value: Value,
}

/// Box score `linescore` document: per-team period scores and totals
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Linescore {
    #[serde(default)]
    pub teams: Vec<LinescoreTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinescoreTeam {
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    #[serde(default)]
    pub team: WireTeam,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub linescores: Vec<Value>,
}

impl LinescoreTeam {
    /// Reported total, or the sum of the period scores when no total is given
    fn total(&self) -> Option<i64> {
        lenient_i64(&self.score).or_else(|| {
            let periods: Vec<i64> = self
                .linescores
                .iter()
                .filter_map(|p| match p {
                    Value::Object(map) => map.get("value").and_then(lenient_i64),
                    other => lenient_i64(other),
                })
                .collect();
            if periods.is_empty() {
                None
            } else {
                Some(periods.iter().sum())
            }
        })
    }
}

/// One side of a box score
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamBoxLine {
    pub team_name: Option<String>,
    pub metrics: BTreeMap<String, f64>,
}

/// Joined box score. Each sub-document contributes its fields only when it
/// was fetched and parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxScoreRecord {
    pub external_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub home: TeamBoxLine,
    pub away: TeamBoxLine,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub summary_available: bool,
    pub linescore_available: bool,
}

/// Provider statistic name to metric key: `totalYards` -> `total_yards`.
/// Net passing yards are reported as plain `passing_yards`.
pub fn metric_key(stat_name: &str) -> String {
    if stat_name == "netPassingYards" {
        return "passing_yards".to_string();
    }
    let mut key = String::with_capacity(stat_name.len() + 4);
    for c in stat_name.chars() {
        if c.is_ascii_uppercase() {
            if !key.is_empty() {
                key.push('_');
            }
            key.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            key.push(c);
        } else if !key.ends_with('_') && !key.is_empty() {
            key.push('_');
        }
    }
    key
}

impl BoxScoreRecord {
    pub fn join(
        event_id: &str,
        summary: Option<BoxScoreSummary>,
        linescore: Option<Linescore>,
    ) -> Self {
        let mut record = BoxScoreRecord {
            external_id: Some(event_id.to_string()),
            summary_available: summary.is_some(),
            linescore_available: linescore.is_some(),
            ..Default::default()
        };

        if let Some(summary) = summary {
            if let Some(header) = summary.header {
                if let Some(id) = header.id {
                    record.external_id = Some(id);
                }
                record.date = header
                    .competitions
                    .first()
                    .and_then(|c| c.date.as_deref())
                    .and_then(parse_event_date);
            }

            for team in summary.boxscore.map(|b| b.teams).unwrap_or_default() {
                let side = match team.home_away.as_deref() {
                    Some("home") => &mut record.home,
                    Some("away") => &mut record.away,
                    _ => continue,
                };
                side.team_name = team.team.best_name();
                for stat in team.statistics {
                    if let (Some(name), Some(value)) = (stat.name, lenient_f64(&stat.display_value))
                    {
                        side.metrics.insert(metric_key(&name), value);
                    }
                }
            }
        }

        if let Some(linescore) = linescore {
            for team in linescore.teams {
                let total = team.total();
                let (side, score) = match team.home_away.as_deref() {
                    Some("home") => (&mut record.home, &mut record.home_score),
                    Some("away") => (&mut record.away, &mut record.away_score),
                    _ => continue,
                };
                if side.team_name.is_none() {
                    side.team_name = team.team.best_name();
                }
                *score = total;
                if let Some(points) = total {
                    side.metrics.insert("points".to_string(), points as f64);
                }
            }
        }

        record
    }
}

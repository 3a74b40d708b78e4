//! Typed configuration sections. Each section is built once at startup and
//! handed by reference to the component that owns it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{self, analytics as analytics_defaults, prediction as prediction_defaults};
use crate::store::RatingSystem;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout applied to every provider request
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Timeout for each box score sub-document
    pub sub_fetch_timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            sub_fetch_timeout_seconds: constants::box_score::SUB_FETCH_TIMEOUT_SECONDS,
        }
    }
}

/// Column layout of an HTML ratings table. Column indices are zero-based
/// positions of `<td>` cells within a row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RatingsTableConfig {
    pub row_selector: String,
    pub team_column: usize,
    pub rank_column: Option<usize>,
    pub value_column: usize,
    pub offense_column: Option<usize>,
    pub defense_column: Option<usize>,
}

impl Default for RatingsTableConfig {
    fn default() -> Self {
        Self {
            row_selector: "table.ratings tbody tr".to_string(),
            team_column: 1,
            rank_column: Some(0),
            value_column: 2,
            offense_column: None,
            defense_column: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleTableConfig {
    pub row_selector: String,
    pub date_column: usize,
    pub away_column: usize,
    pub home_column: usize,
    pub away_score_column: Option<usize>,
    pub home_score_column: Option<usize>,
    /// chrono format string for the date cell
    pub date_format: String,
}

impl Default for ScheduleTableConfig {
    fn default() -> Self {
        Self {
            row_selector: "table.schedule tbody tr".to_string(),
            date_column: 0,
            away_column: 1,
            home_column: 2,
            away_score_column: Some(3),
            home_score_column: Some(4),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

/// Provider endpoints. Empty strings mean "not configured"; the matching
/// fetcher reports a configuration error when invoked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub scoreboard_url: String,
    pub box_score_url: String,
    pub schedule_url: String,
    pub ratings_api_url: String,
    /// Rankings page per rating system, e.g. `elo = "https://..."`
    pub rankings_pages: BTreeMap<RatingSystem, String>,
    pub rankings_table: RatingsTableConfig,
    pub schedule_table: ScheduleTableConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            scoreboard_url:
                "https://site.api.espn.com/apis/site/v2/sports/football/college-football/scoreboard"
                    .to_string(),
            box_score_url: String::new(),
            schedule_url: String::new(),
            ratings_api_url: String::new(),
            rankings_pages: BTreeMap::new(),
            rankings_table: RatingsTableConfig::default(),
            schedule_table: ScheduleTableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path; defaults to the platform data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RatingsConfig {
    pub cache_ttl_seconds: u64,
    pub cache_capacity: usize,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: constants::cache_ttl::RATINGS_BUNDLE_SECONDS,
            cache_capacity: constants::cache_capacity::RATINGS_BUNDLES,
        }
    }
}

/// Calibration of one rating dimension used by the win probability model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingDimension {
    pub system: RatingSystem,
    /// Logistic divisor: `p = 1 / (1 + 10^((away - home) / scale))`
    pub scale: f64,
    /// Points of spread per rating point of differential
    pub points_per_rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    pub dimension_a: RatingDimension,
    pub dimension_b: RatingDimension,
    pub home_field_points: f64,
    pub probability_precision: u32,
    pub spread_precision: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            dimension_a: RatingDimension {
                system: RatingSystem::Elo,
                scale: prediction_defaults::ELO_SCALE,
                points_per_rating: prediction_defaults::ELO_POINTS_PER_RATING,
            },
            dimension_b: RatingDimension {
                system: RatingSystem::PowerIndex,
                scale: prediction_defaults::POWER_INDEX_SCALE,
                points_per_rating: prediction_defaults::POWER_INDEX_POINTS_PER_RATING,
            },
            home_field_points: 0.0,
            probability_precision: prediction_defaults::PROBABILITY_PRECISION,
            spread_precision: prediction_defaults::SPREAD_PRECISION,
        }
    }
}

/// Slope buckets, expressed as percent of the window mean per game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrendThresholds {
    pub strong: f64,
    pub moderate: f64,
    pub slight: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            strong: analytics_defaults::TREND_STRONG_PCT,
            moderate: analytics_defaults::TREND_MODERATE_PCT,
            slight: analytics_defaults::TREND_SLIGHT_PCT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MomentumThresholds {
    pub strong: f64,
    pub mild: f64,
}

impl Default for MomentumThresholds {
    fn default() -> Self {
        Self {
            strong: analytics_defaults::MOMENTUM_STRONG_PCT,
            mild: analytics_defaults::MOMENTUM_MILD_PCT,
        }
    }
}

/// Upper bounds of the coefficient of variation bands (percent)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsistencyThresholds {
    pub very_consistent: f64,
    pub consistent: f64,
    pub moderate: f64,
}

impl Default for ConsistencyThresholds {
    fn default() -> Self {
        Self {
            very_consistent: analytics_defaults::CV_VERY_CONSISTENT,
            consistent: analytics_defaults::CV_CONSISTENT,
            moderate: analytics_defaults::CV_MODERATE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub default_window: usize,
    pub moving_average_windows: Vec<usize>,
    pub metrics: Vec<String>,
    pub default_precision: u32,
    /// Per-metric decimal places, overriding `default_precision`
    pub precision: BTreeMap<String, u32>,
    pub trend: TrendThresholds,
    pub momentum: MomentumThresholds,
    pub consistency: ConsistencyThresholds,
    pub cache_ttl_seconds: u64,
    pub cache_capacity: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_window: analytics_defaults::DEFAULT_WINDOW,
            moving_average_windows: analytics_defaults::MOVING_AVERAGE_WINDOWS.to_vec(),
            metrics: analytics_defaults::TRACKED_METRICS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            default_precision: analytics_defaults::DEFAULT_PRECISION,
            precision: BTreeMap::new(),
            trend: TrendThresholds::default(),
            momentum: MomentumThresholds::default(),
            consistency: ConsistencyThresholds::default(),
            cache_ttl_seconds: constants::cache_ttl::ANALYTICS_SECONDS,
            cache_capacity: constants::cache_capacity::ANALYTICS,
        }
    }
}

impl AnalyticsConfig {
    /// Decimal places used when rounding values of `metric`
    pub fn precision_for(&self, metric: &str) -> u32 {
        self.precision
            .get(metric)
            .copied()
            .unwrap_or(self.default_precision)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobsConfig {
    pub workers: usize,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_seconds: u64,
    pub queue_capacity: usize,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: constants::retry::WORKERS,
            max_retries: constants::retry::MAX_ATTEMPTS,
            base_backoff_ms: constants::retry::BASE_DELAY_MS,
            max_backoff_seconds: constants::retry::MAX_DELAY_SECONDS,
            queue_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_for_falls_back_to_default() {
        let mut config = AnalyticsConfig::default();
        config.precision.insert("points".to_string(), 0);

        assert_eq!(config.precision_for("points"), 0);
        assert_eq!(config.precision_for("total_yards"), 1);
    }

    #[test]
    fn test_prediction_defaults_use_elo_and_power_index() {
        let config = PredictionConfig::default();
        assert_eq!(config.dimension_a.system, RatingSystem::Elo);
        assert_eq!(config.dimension_a.scale, 400.0);
        assert_eq!(config.dimension_b.system, RatingSystem::PowerIndex);
        assert_eq!(config.dimension_b.scale, 10.0);
        assert_eq!(config.probability_precision, 4);
    }

    #[test]
    fn test_partial_analytics_section_keeps_defaults() {
        let toml_str = r#"
default_window = 8

[trend]
strong = 7.5
"#;
        let config: AnalyticsConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_window, 8);
        assert_eq!(config.trend.strong, 7.5);
        assert_eq!(config.trend.moderate, 2.0);
        assert_eq!(config.moving_average_windows, vec![3, 5]);
    }

    #[test]
    fn test_rankings_pages_keyed_by_system() {
        let toml_str = r#"
[rankings_pages]
elo = "https://ratings.example.com/elo"
power_index = "https://ratings.example.com/power"
"#;
        let config: SourcesConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.rankings_pages.get(&RatingSystem::Elo).map(String::as_str),
            Some("https://ratings.example.com/elo")
        );
        assert!(config.rankings_pages.contains_key(&RatingSystem::PowerIndex));
    }
}

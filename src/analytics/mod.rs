//! Rolling team analytics over the most recent games: moving averages,
//! regression trend, momentum and consistency per tracked metric.

pub mod stats;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::{
    AnalyticsConfig, ConsistencyThresholds, MomentumThresholds, TrendThresholds,
};
use crate::data_fetcher::cache::TtlCache;
use crate::error::AppError;
use crate::ingest::CacheInvalidator;
use crate::prediction::round_to;
use crate::store::{Store, TeamId};

const MIN_TREND_POINTS: usize = 2;
const MIN_MOMENTUM_POINTS: usize = 2;
const MIN_CONSISTENCY_POINTS: usize = 2;

/// A computed value, or an explicit marker that there were too few games.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric<T> {
    Available { value: T },
    InsufficientData { required: usize, available: usize },
}

impl<T> Metric<T> {
    fn from_option(value: Option<T>, required: usize, available: usize) -> Self {
        match value {
            Some(value) => Metric::Available { value },
            None => Metric::InsufficientData {
                required,
                available,
            },
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Metric::Available { value } => Some(value),
            Metric::InsufficientData { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, Metric::InsufficientData { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    StrongUpward,
    ModerateUpward,
    SlightUpward,
    Stable,
    SlightDownward,
    ModerateDownward,
    StrongDownward,
}

impl TrendDirection {
    /// Buckets a slope given as percent of the mean per game
    pub fn classify(slope_pct: f64, thresholds: &TrendThresholds) -> Self {
        let magnitude = slope_pct.abs();
        let upward = slope_pct > 0.0;
        if magnitude >= thresholds.strong {
            if upward { Self::StrongUpward } else { Self::StrongDownward }
        } else if magnitude >= thresholds.moderate {
            if upward { Self::ModerateUpward } else { Self::ModerateDownward }
        } else if magnitude >= thresholds.slight {
            if upward { Self::SlightUpward } else { Self::SlightDownward }
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumDirection {
    StrongPositive,
    Positive,
    Neutral,
    Negative,
    StrongNegative,
}

impl MomentumDirection {
    pub fn classify(change_pct: f64, thresholds: &MomentumThresholds) -> Self {
        if change_pct >= thresholds.strong {
            Self::StrongPositive
        } else if change_pct >= thresholds.mild {
            Self::Positive
        } else if change_pct <= -thresholds.strong {
            Self::StrongNegative
        } else if change_pct <= -thresholds.mild {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyBand {
    VeryConsistent,
    Consistent,
    Moderate,
    Volatile,
}

impl ConsistencyBand {
    pub fn classify(cv: f64, thresholds: &ConsistencyThresholds) -> Self {
        if cv < thresholds.very_consistent {
            Self::VeryConsistent
        } else if cv < thresholds.consistent {
            Self::Consistent
        } else if cv < thresholds.moderate {
            Self::Moderate
        } else {
            Self::Volatile
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverage {
    pub window: usize,
    pub average: Metric<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Slope as percent of the mean, per game
    pub slope_pct: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Momentum {
    pub change_pct: f64,
    pub direction: MomentumDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consistency {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// Coefficient of variation in percent
    pub cv: f64,
    pub band: ConsistencyBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAnalytics {
    /// Games in the window that reported this metric
    pub games: usize,
    pub moving_averages: Vec<MovingAverage>,
    pub trend: Metric<Trend>,
    pub momentum: Metric<Momentum>,
    pub consistency: Metric<Consistency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAnalytics {
    pub team_id: TeamId,
    pub window: usize,
    pub games_analyzed: usize,
    pub first_game: Option<NaiveDate>,
    pub last_game: Option<NaiveDate>,
    pub metrics: BTreeMap<String, MetricAnalytics>,
}

/// Computes all sub-metrics of one series (oldest first).
pub fn analyze_series(values: &[f64], metric: &str, config: &AnalyticsConfig) -> MetricAnalytics {
    let places = config.precision_for(metric);
    let round = |v: f64| round_to(v, places);
    let n = values.len();

    let moving_averages = config
        .moving_average_windows
        .iter()
        .map(|&window| MovingAverage {
            window,
            average: Metric::from_option(
                stats::moving_average(values, window).map(round),
                window,
                n,
            ),
        })
        .collect();

    let trend = stats::linear_regression(values).map(|fit| {
        let mean = stats::mean(values).unwrap_or(0.0);
        let slope_pct = if mean == 0.0 {
            0.0
        } else {
            fit.slope / mean.abs() * 100.0
        };
        Trend {
            slope: round(fit.slope),
            intercept: round(fit.intercept),
            r_squared: round(fit.r_squared),
            slope_pct: round(slope_pct),
            direction: TrendDirection::classify(slope_pct, &config.trend),
        }
    });

    let momentum = stats::momentum_change(values).map(|change| Momentum {
        change_pct: round(change),
        direction: MomentumDirection::classify(change, &config.momentum),
    });

    let consistency = (n >= MIN_CONSISTENCY_POINTS)
        .then(|| {
            let cv = stats::coefficient_of_variation(values)?;
            Some(Consistency {
                mean: round(stats::mean(values)?),
                median: round(stats::median(values)?),
                std_dev: round(stats::population_std_dev(values)?),
                cv: round(cv),
                band: ConsistencyBand::classify(cv, &config.consistency),
            })
        })
        .flatten();

    MetricAnalytics {
        games: n,
        moving_averages,
        trend: Metric::from_option(trend, MIN_TREND_POINTS, n),
        momentum: Metric::from_option(momentum, MIN_MOMENTUM_POINTS, n),
        consistency: Metric::from_option(consistency, MIN_CONSISTENCY_POINTS, n),
    }
}

fn cache_key(team_id: TeamId, window: usize) -> String {
    format!("analytics_{team_id}_{window}")
}

pub struct AnalyticsEngine {
    store: Arc<dyn Store>,
    config: AnalyticsConfig,
    cache: TtlCache<String, TeamAnalytics>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn Store>, config: AnalyticsConfig) -> Self {
        let cache = TtlCache::new(
            "analytics",
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_seconds),
        );
        Self {
            store,
            config,
            cache,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Analytics over the team's most recent `window` games.
    /// `None` uses the configured default window.
    #[instrument(skip(self), fields(team_id = %team_id))]
    pub async fn analyze(
        &self,
        team_id: TeamId,
        window: Option<usize>,
    ) -> Result<TeamAnalytics, AppError> {
        let window = window.unwrap_or(self.config.default_window);
        if window == 0 {
            return Err(AppError::config_error("analytics window must be positive"));
        }

        let key = cache_key(team_id, window);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        if self.store.team(team_id)?.is_none() {
            return Err(AppError::team_not_found(team_id.0));
        }

        let mut lines = self.store.recent_stat_lines(team_id, window)?;
        lines.reverse();
        debug!("Analyzing {} games for team {team_id}", lines.len());

        let metrics = self
            .config
            .metrics
            .iter()
            .map(|metric| {
                let values: Vec<f64> = lines.iter().filter_map(|line| line.metric(metric)).collect();
                (metric.clone(), analyze_series(&values, metric, &self.config))
            })
            .collect();

        let analytics = TeamAnalytics {
            team_id,
            window,
            games_analyzed: lines.len(),
            first_game: lines.first().map(|line| line.game_date),
            last_game: lines.last().map(|line| line.game_date),
            metrics,
        };

        self.cache.insert(key, analytics.clone()).await;
        Ok(analytics)
    }

    /// Drops every cached window of the team. Returns how many were dropped.
    pub async fn invalidate_team(&self, team_id: TeamId) -> usize {
        self.cache
            .invalidate_if(|_, analytics| analytics.team_id == team_id)
            .await
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }
}

#[async_trait]
impl CacheInvalidator for AnalyticsEngine {
    async fn invalidate_team(&self, team_id: TeamId) {
        AnalyticsEngine::invalidate_team(self, team_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GameUpsert, NewTeam, RecentGameStatLine, SqliteStore};

    const SERIES: [f64; 5] = [300.0, 320.0, 340.0, 310.0, 330.0];

    #[test]
    fn test_series_example() {
        let analytics = analyze_series(&SERIES, "total_yards", &AnalyticsConfig::default());

        assert_eq!(analytics.games, 5);
        assert_eq!(analytics.moving_averages[0].window, 3);
        assert_eq!(analytics.moving_averages[0].average.value(), Some(&326.7));
        assert_eq!(analytics.moving_averages[1].average.value(), Some(&320.0));

        let trend = analytics.trend.value().unwrap();
        assert_eq!(trend.slope, 5.0);
        assert_eq!(trend.direction, TrendDirection::SlightUpward);

        let momentum = analytics.momentum.value().unwrap();
        assert_eq!(momentum.change_pct, 3.2);
        assert_eq!(momentum.direction, MomentumDirection::Positive);

        let consistency = analytics.consistency.value().unwrap();
        assert_eq!(consistency.mean, 320.0);
        assert_eq!(consistency.median, 320.0);
        assert_eq!(consistency.band, ConsistencyBand::VeryConsistent);
    }

    #[test]
    fn test_empty_series_is_insufficient_everywhere() {
        let analytics = analyze_series(&[], "points", &AnalyticsConfig::default());
        assert!(analytics.moving_averages.iter().all(|ma| ma.average.is_insufficient()));
        assert!(analytics.trend.is_insufficient());
        assert!(analytics.momentum.is_insufficient());
        assert!(analytics.consistency.is_insufficient());
    }

    #[test]
    fn test_zero_mean_consistency() {
        let analytics = analyze_series(&[0.0, 0.0, 0.0], "turnovers", &AnalyticsConfig::default());
        let consistency = analytics.consistency.value().unwrap();
        assert_eq!(consistency.cv, 0.0);
        assert_eq!(consistency.band, ConsistencyBand::VeryConsistent);
    }

    #[test]
    fn test_per_metric_precision() {
        let mut config = AnalyticsConfig::default();
        config.precision.insert("points".to_string(), 2);
        let analytics = analyze_series(&[10.0, 20.0, 21.0], "points", &config);
        assert_eq!(analytics.moving_averages[0].average.value(), Some(&17.0));
        let consistency = analytics.consistency.value().unwrap();
        assert_eq!(consistency.mean, 17.0);
        assert_eq!(consistency.std_dev, 4.97);
    }

    #[test]
    fn test_trend_buckets() {
        let thresholds = TrendThresholds::default();
        assert_eq!(TrendDirection::classify(6.0, &thresholds), TrendDirection::StrongUpward);
        assert_eq!(TrendDirection::classify(-2.5, &thresholds), TrendDirection::ModerateDownward);
        assert_eq!(TrendDirection::classify(-0.6, &thresholds), TrendDirection::SlightDownward);
        assert_eq!(TrendDirection::classify(0.1, &thresholds), TrendDirection::Stable);
    }

    #[test]
    fn test_metric_serializes_with_status_tag() {
        let missing: Metric<f64> = Metric::InsufficientData {
            required: 3,
            available: 1,
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["required"], 3);
    }

    fn seeded_engine() -> (Arc<SqliteStore>, AnalyticsEngine, TeamId) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let team = store.upsert_team(&NewTeam::named("Oregon")).unwrap();
        let opponent = store.upsert_team(&NewTeam::named("Oregon State")).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();

        for (i, yards) in SERIES.iter().enumerate() {
            let date = start + chrono::Duration::days(7 * i as i64);
            let game_id = store
                .upsert_game(&GameUpsert::new(2024, date, team, opponent))
                .unwrap();
            store
                .upsert_stat_line(&RecentGameStatLine {
                    team_id: team,
                    game_id,
                    game_date: date,
                    opponent_team_id: Some(opponent),
                    metrics: BTreeMap::from([("total_yards".to_string(), *yards)]),
                })
                .unwrap();
        }

        let engine = AnalyticsEngine::new(store.clone(), AnalyticsConfig::default());
        (store, engine, team)
    }

    #[tokio::test]
    async fn test_engine_reads_recent_games_in_order() {
        let (_, engine, team) = seeded_engine();
        let analytics = engine.analyze(team, Some(5)).await.unwrap();

        assert_eq!(analytics.games_analyzed, 5);
        assert_eq!(analytics.first_game, NaiveDate::from_ymd_opt(2024, 9, 7));
        let yards = &analytics.metrics["total_yards"];
        assert_eq!(yards.trend.value().unwrap().slope, 5.0);
        assert_eq!(analytics.metrics["points"].games, 0);
        assert!(analytics.metrics["points"].trend.is_insufficient());
    }

    #[tokio::test]
    async fn test_engine_without_games() {
        let (store, engine, _) = seeded_engine();
        let idle = store.upsert_team(&NewTeam::named("Idaho")).unwrap();
        let analytics = engine.analyze(idle, None).await.unwrap();

        assert_eq!(analytics.games_analyzed, 0);
        for metric in analytics.metrics.values() {
            assert!(metric.trend.is_insufficient());
            assert!(metric.momentum.is_insufficient());
            assert!(metric.consistency.is_insufficient());
        }
    }

    #[tokio::test]
    async fn test_engine_cache_and_invalidation() {
        let (_, engine, team) = seeded_engine();
        engine.analyze(team, Some(3)).await.unwrap();
        engine.analyze(team, Some(5)).await.unwrap();

        assert_eq!(engine.invalidate_team(team).await, 2);
        assert_eq!(engine.invalidate_team(team).await, 0);
    }

    #[tokio::test]
    async fn test_engine_rejects_unknown_team_and_zero_window() {
        let (_, engine, team) = seeded_engine();
        assert!(matches!(
            engine.analyze(TeamId(999), None).await,
            Err(AppError::TeamNotFound { .. })
        ));
        assert!(matches!(
            engine.analyze(team, Some(0)).await,
            Err(AppError::Config(_))
        ));
    }
}

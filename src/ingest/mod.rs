//! Ingestion: resolves every team-bearing field of fetched records, then
//! upserts by natural key. Re-applying a record is a no-op.

pub mod report;

pub use report::IngestReport;

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{SeasonConfig, season_for_date, week_for_date};
use crate::constants::validation::{MAX_TEAM_NAME_LENGTH, MAX_TEAM_SCORE};
use crate::data_fetcher::models::{
    AdvancedRatingRecord, BoxScoreRecord, RankingRecord, ScheduleRecord, ScoreboardRecord,
};
use crate::error::AppError;
use crate::resolver::{EntityResolver, Resolution};
use crate::store::{
    Game, GameUpsert, NewTeam, RatingSnapshot, RatingSystem, RecentGameStatLine, Store, TeamId,
};

/// Source tags used for provider-scoped alias lookups
pub mod sources {
    pub const SCOREBOARD: &str = "scoreboard";
    pub const RANKINGS: &str = "rankings";
    pub const RATINGS_API: &str = "ratings_api";
    pub const SCHEDULE: &str = "schedule";
    pub const BOX_SCORE: &str = "box_score";
}

/// A component holding cached aggregates derived from a team's rows.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate_team(&self, team_id: TeamId);
}

fn plausible_name(name: &str) -> bool {
    !name.trim().is_empty() && name.len() <= MAX_TEAM_NAME_LENGTH
}

fn plausible_score(score: Option<i64>) -> bool {
    score.is_none_or(|s| (0..=MAX_TEAM_SCORE).contains(&s))
}

pub struct Ingestor {
    store: Arc<dyn Store>,
    resolver: EntityResolver,
    seasons: Vec<SeasonConfig>,
    invalidators: Vec<Arc<dyn CacheInvalidator>>,
}

impl Ingestor {
    /// Builds an ingestor with a resolver snapshot of the store's registry
    pub fn new(store: Arc<dyn Store>, seasons: Vec<SeasonConfig>) -> Result<Self, AppError> {
        let resolver = EntityResolver::from_store(store.as_ref())?;
        Ok(Self {
            store,
            resolver,
            seasons,
            invalidators: Vec::new(),
        })
    }

    /// Registers a cache to be invalidated when a team's ratings or stat lines change
    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidators.push(invalidator);
        self
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    /// Rebuilds the resolver after the registry changed
    pub fn reload_resolver(&mut self) -> Result<(), AppError> {
        self.resolver = EntityResolver::from_store(self.store.as_ref())?;
        Ok(())
    }

    /// Administrative import of the team registry and its aliases.
    pub fn import_teams(&mut self, teams: &[NewTeam]) -> Result<IngestReport, AppError> {
        let mut report = IngestReport::default();
        for team in teams {
            if !plausible_name(&team.name) {
                warn!("Skipping team with implausible name: {:?}", team.name);
                report.skipped_invalid += 1;
                continue;
            }
            self.store.upsert_team(team)?;
            report.upserted += 1;
        }
        self.reload_resolver()?;
        info!("Imported {} teams", report.upserted);
        Ok(report)
    }

    fn resolve(&self, raw: &str, source: &str, report: &mut IngestReport) -> Option<TeamId> {
        match self.resolver.resolve_for_source(raw, source) {
            Resolution::Resolved { team_id, .. } => Some(team_id),
            Resolution::Unresolved { raw } => {
                report.record_unresolved(&raw);
                None
            }
        }
    }

    fn season_of(&self, date: chrono::NaiveDate) -> i32 {
        season_for_date(&self.seasons, date)
    }

    async fn invalidate(&self, teams: &BTreeSet<TeamId>) {
        for team_id in teams {
            for invalidator in &self.invalidators {
                invalidator.invalidate_team(*team_id).await;
            }
        }
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest_scoreboard(&self, records: &[ScoreboardRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        for record in records {
            let (Some(date), Some(home_name), Some(away_name)) = (
                record.date,
                record.home_name.as_deref(),
                record.away_name.as_deref(),
            ) else {
                debug!("Scoreboard record missing date or teams: {record:?}");
                report.skipped_invalid += 1;
                continue;
            };
            if !plausible_score(record.home_score) || !plausible_score(record.away_score) {
                warn!("Implausible scoreboard score: {record:?}");
                report.skipped_invalid += 1;
                continue;
            }

            let home = self.resolve(home_name, sources::SCOREBOARD, &mut report);
            let away = self.resolve(away_name, sources::SCOREBOARD, &mut report);
            let (Some(home), Some(away)) = (home, away) else {
                report.skipped_unresolved += 1;
                continue;
            };
            if home == away {
                report.skipped_invalid += 1;
                continue;
            }

            let game = GameUpsert {
                external_id: record.external_id.clone(),
                week: record.week.or_else(|| week_for_date(&self.seasons, date)),
                home_score: record.home_score,
                away_score: record.away_score,
                completed: record.completed,
                venue: record.venue.clone(),
                ..GameUpsert::new(
                    record.season.unwrap_or_else(|| self.season_of(date)),
                    date,
                    home,
                    away,
                )
            };
            match self.store.upsert_game(&game) {
                Ok(_) => report.upserted += 1,
                Err(e) => {
                    error!("Failed to upsert scoreboard game {home_name} vs {away_name}: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            "Scoreboard ingest: upserted={}, unresolved={}, invalid={}, failed={}",
            report.upserted, report.skipped_unresolved, report.skipped_invalid, report.failed
        );
        report
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest_schedule(&self, records: &[ScheduleRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        for record in records {
            let (Some(date), Some(home_name), Some(away_name)) = (
                record.date,
                record.home_name.as_deref(),
                record.away_name.as_deref(),
            ) else {
                report.skipped_invalid += 1;
                continue;
            };
            if !plausible_score(record.home_score) || !plausible_score(record.away_score) {
                report.skipped_invalid += 1;
                continue;
            }

            let home = self.resolve(home_name, sources::SCHEDULE, &mut report);
            let away = self.resolve(away_name, sources::SCHEDULE, &mut report);
            let (Some(home), Some(away)) = (home, away) else {
                report.skipped_unresolved += 1;
                continue;
            };
            if home == away {
                warn!("Schedule row resolves both sides to team {home}: {record:?}");
                report.skipped_invalid += 1;
                continue;
            }

            let game = GameUpsert {
                week: week_for_date(&self.seasons, date),
                home_score: record.home_score,
                away_score: record.away_score,
                completed: record.is_final().then_some(true),
                ..GameUpsert::new(self.season_of(date), date, home, away)
            };
            match self.store.upsert_game(&game) {
                Ok(_) => report.upserted += 1,
                Err(e) => {
                    error!("Failed to upsert schedule game {away_name} at {home_name}: {e}");
                    report.failed += 1;
                }
            }
        }

        info!(
            "Schedule ingest: upserted={}, unresolved={}, invalid={}",
            report.upserted, report.skipped_unresolved, report.skipped_invalid
        );
        report
    }

    /// Stores one rating table for `system`. `week = None` stores season-level values.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest_rankings(
        &self,
        system: RatingSystem,
        season: i32,
        week: Option<u32>,
        records: &[RankingRecord],
    ) -> IngestReport {
        let mut report = IngestReport::default();
        let mut touched = BTreeSet::new();

        for record in records {
            let (Some(team_name), Some(value)) = (record.team_name.as_deref(), record.value) else {
                debug!("Rating row missing team or value: {record:?}");
                report.skipped_invalid += 1;
                continue;
            };
            let Some(team_id) = self.resolve(team_name, sources::RANKINGS, &mut report) else {
                report.skipped_unresolved += 1;
                continue;
            };

            let snapshot = RatingSnapshot {
                week,
                offense: record.offense,
                defense: record.defense,
                rank: record.rank,
                ..RatingSnapshot::new(team_id, system, season, value)
            };
            match self.store.upsert_rating(&snapshot) {
                Ok(()) => {
                    report.upserted += 1;
                    touched.insert(team_id);
                }
                Err(e) => {
                    error!("Failed to store {system} rating for {team_name}: {e}");
                    report.failed += 1;
                }
            }
        }

        self.invalidate(&touched).await;
        info!(
            "{} ratings ingest: upserted={}, unresolved={}, invalid={}",
            system, report.upserted, report.skipped_unresolved, report.skipped_invalid
        );
        report
    }

    /// Stores efficiency and strength-of-schedule values from the ratings API.
    /// Each present value counts as one upserted snapshot.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn ingest_advanced_ratings(
        &self,
        season: i32,
        week: Option<u32>,
        records: &[AdvancedRatingRecord],
    ) -> IngestReport {
        let mut report = IngestReport::default();
        let mut touched = BTreeSet::new();

        for record in records {
            let Some(team_name) = record.team_name.as_deref() else {
                report.skipped_invalid += 1;
                continue;
            };
            if record.efficiency.is_none() && record.strength_of_schedule.is_none() {
                report.skipped_invalid += 1;
                continue;
            }
            let Some(team_id) = self.resolve(team_name, sources::RATINGS_API, &mut report) else {
                report.skipped_unresolved += 1;
                continue;
            };

            let mut snapshots = Vec::with_capacity(2);
            if let Some(value) = record.efficiency {
                snapshots.push(RatingSnapshot {
                    week,
                    offense: record.efficiency_offense,
                    defense: record.efficiency_defense,
                    rank: record.efficiency_rank,
                    ..RatingSnapshot::new(team_id, RatingSystem::Efficiency, season, value)
                });
            }
            if let Some(value) = record.strength_of_schedule {
                snapshots.push(RatingSnapshot {
                    week,
                    rank: record.strength_of_schedule_rank,
                    ..RatingSnapshot::new(team_id, RatingSystem::StrengthOfSchedule, season, value)
                });
            }

            for snapshot in snapshots {
                match self.store.upsert_rating(&snapshot) {
                    Ok(()) => {
                        report.upserted += 1;
                        touched.insert(team_id);
                    }
                    Err(e) => {
                        error!("Failed to store {} rating for {team_name}: {e}", snapshot.system);
                        report.failed += 1;
                    }
                }
            }
        }

        self.invalidate(&touched).await;
        report
    }

    fn locate_box_score_game(
        &self,
        record: &BoxScoreRecord,
        report: &mut IngestReport,
    ) -> Result<Option<Game>, AppError> {
        if let Some(external_id) = record.external_id.as_deref()
            && let Some(game) = self.store.game_by_external_id(external_id)?
        {
            return Ok(Some(game));
        }

        let (Some(date), Some(home_name), Some(away_name)) = (
            record.date,
            record.home.team_name.as_deref(),
            record.away.team_name.as_deref(),
        ) else {
            return Ok(None);
        };

        let home = self.resolve(home_name, sources::BOX_SCORE, report);
        let away = self.resolve(away_name, sources::BOX_SCORE, report);
        let (Some(home), Some(away)) = (home, away) else {
            report.skipped_unresolved += 1;
            return Ok(None);
        };
        if home == away {
            warn!("Box score resolves both sides to team {home}");
            return Ok(None);
        }

        let game = GameUpsert {
            external_id: record.external_id.clone(),
            week: week_for_date(&self.seasons, date),
            ..GameUpsert::new(self.season_of(date), date, home, away)
        };
        let id = self.store.upsert_game(&game)?;
        self.store.game(id)
    }

    /// Stores a box score: final score on the game row plus one stat line per team.
    #[instrument(skip(self, record), fields(event = ?record.external_id))]
    pub async fn ingest_box_score(&self, record: &BoxScoreRecord) -> Result<IngestReport, AppError> {
        let mut report = IngestReport::default();
        if !plausible_score(record.home_score) || !plausible_score(record.away_score) {
            report.skipped_invalid += 1;
            return Ok(report);
        }

        let Some(game) = self.locate_box_score_game(record, &mut report)? else {
            if report.skipped_unresolved == 0 {
                warn!("Box score without a known game or enough fields to create one");
                report.skipped_invalid += 1;
            }
            return Ok(report);
        };

        if record.home_score.is_some() || record.away_score.is_some() {
            let scores = GameUpsert {
                home_score: record.home_score,
                away_score: record.away_score,
                ..GameUpsert::new(game.season, game.game_date, game.home_team_id, game.away_team_id)
            };
            self.store.upsert_game(&scores)?;
        }

        let mut touched = BTreeSet::new();
        for (line, team_id, opponent) in [
            (&record.home, game.home_team_id, game.away_team_id),
            (&record.away, game.away_team_id, game.home_team_id),
        ] {
            if line.metrics.is_empty() {
                continue;
            }
            self.store.upsert_stat_line(&RecentGameStatLine {
                team_id,
                game_id: game.id,
                game_date: game.game_date,
                opponent_team_id: Some(opponent),
                metrics: line.metrics.clone(),
            })?;
            report.upserted += 1;
            touched.insert(team_id);
        }

        self.invalidate(&touched).await;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GameFilter, RatingFilter, SqliteStore};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingInvalidator {
        teams: Mutex<Vec<TeamId>>,
    }

    #[async_trait]
    impl CacheInvalidator for RecordingInvalidator {
        async fn invalidate_team(&self, team_id: TeamId) {
            self.teams.lock().unwrap().push(team_id);
        }
    }

    fn setup() -> (Arc<SqliteStore>, Ingestor) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let mut ingestor = Ingestor::new(store.clone(), Vec::new()).unwrap();
        let mut michigan = NewTeam::named("Michigan");
        michigan.aliases = vec!["Michigan Wolverines".to_string()];
        ingestor
            .import_teams(&[NewTeam::named("Ohio State"), michigan])
            .unwrap();
        (store, ingestor)
    }

    fn scoreboard_record() -> ScoreboardRecord {
        ScoreboardRecord {
            external_id: Some("401".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 11, 30),
            season: Some(2024),
            week: Some(14),
            completed: Some(true),
            home_name: Some("Ohio State".to_string()),
            away_name: Some("Michigan Wolverines".to_string()),
            home_score: Some(10),
            away_score: Some(13),
            venue: None,
        }
    }

    #[tokio::test]
    async fn test_scoreboard_ingest_is_idempotent() {
        let (store, ingestor) = setup();
        let records = vec![scoreboard_record()];

        let first = ingestor.ingest_scoreboard(&records).await;
        let second = ingestor.ingest_scoreboard(&records).await;
        assert_eq!(first.upserted, 1);
        assert_eq!(second.upserted, 1);

        let games = store.games(&GameFilter::default()).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].final_score(), Some((10, 13)));
        assert_eq!(games[0].week, Some(14));
    }

    #[tokio::test]
    async fn test_unresolved_teams_are_reported_not_written() {
        let (store, ingestor) = setup();
        let mut record = scoreboard_record();
        record.away_name = Some("Xavier".to_string());

        let report = ingestor.ingest_scoreboard(&[record]).await;
        assert_eq!(report.upserted, 0);
        assert_eq!(report.skipped_unresolved, 1);
        assert_eq!(report.unresolved_names, vec!["Xavier"]);
        assert!(store.games(&GameFilter::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_records_are_skipped() {
        let (_, ingestor) = setup();
        let mut missing_date = scoreboard_record();
        missing_date.date = None;
        let mut absurd_score = scoreboard_record();
        absurd_score.home_score = Some(-3);

        let report = ingestor
            .ingest_scoreboard(&[missing_date, absurd_score])
            .await;
        assert_eq!(report.skipped_invalid, 2);
        assert_eq!(report.upserted, 0);
    }

    #[tokio::test]
    async fn test_rankings_ingest_invalidates_touched_teams() {
        let (store, ingestor) = setup();
        let invalidator = Arc::new(RecordingInvalidator::default());
        let ingestor = ingestor.with_invalidator(invalidator.clone());

        let records = vec![
            RankingRecord {
                team_name: Some("Ohio State".to_string()),
                rank: Some(2),
                value: Some(1688.0),
                ..Default::default()
            },
            RankingRecord {
                team_name: Some("Michigan".to_string()),
                value: None,
                ..Default::default()
            },
        ];
        let report = ingestor
            .ingest_rankings(RatingSystem::Elo, 2024, Some(14), &records)
            .await;
        assert_eq!(report.upserted, 1);
        assert_eq!(report.skipped_invalid, 1);

        let ratings = store.ratings(&RatingFilter::default()).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].rank, Some(2));
        assert_eq!(invalidator.teams.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_advanced_ratings_split_into_two_systems() {
        let (store, ingestor) = setup();
        let records = vec![AdvancedRatingRecord {
            team_name: Some("Michigan".to_string()),
            efficiency: Some(12.5),
            strength_of_schedule: Some(0.58),
            ..Default::default()
        }];

        let report = ingestor.ingest_advanced_ratings(2024, None, &records).await;
        assert_eq!(report.upserted, 2);

        let systems: Vec<_> = store
            .ratings(&RatingFilter::default())
            .unwrap()
            .into_iter()
            .map(|r| r.system)
            .collect();
        assert!(systems.contains(&RatingSystem::Efficiency));
        assert!(systems.contains(&RatingSystem::StrengthOfSchedule));
    }

    #[tokio::test]
    async fn test_box_score_attaches_to_known_game() {
        let (store, ingestor) = setup();
        ingestor.ingest_scoreboard(&[scoreboard_record()]).await;

        let mut record = BoxScoreRecord {
            external_id: Some("401".to_string()),
            home_score: Some(10),
            away_score: Some(13),
            ..Default::default()
        };
        record.home.metrics = BTreeMap::from([("total_yards".to_string(), 452.0)]);
        record.away.metrics = BTreeMap::from([("total_yards".to_string(), 301.0)]);

        let report = ingestor.ingest_box_score(&record).await.unwrap();
        assert_eq!(report.upserted, 2);

        let ohio_state = store.teams().unwrap()[0].id;
        let lines = store.recent_stat_lines(ohio_state, 5).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].metric("total_yards"), Some(452.0));
        assert!(lines[0].opponent_team_id.is_some());
    }

    #[tokio::test]
    async fn test_schedule_row_naming_one_team_twice_is_invalid() {
        let (store, ingestor) = setup();
        let rows = vec![
            ScheduleRecord {
                date: NaiveDate::from_ymd_opt(2024, 11, 30),
                away_name: Some("Michigan Wolverines".to_string()),
                home_name: Some("Michigan".to_string()),
                ..Default::default()
            },
            ScheduleRecord {
                date: NaiveDate::from_ymd_opt(2024, 11, 30),
                away_name: Some("Michigan".to_string()),
                home_name: Some("Ohio State".to_string()),
                ..Default::default()
            },
        ];

        let report = ingestor.ingest_schedule(&rows).await;
        assert_eq!(report.skipped_invalid, 1);
        assert_eq!(report.upserted, 1);

        let games = store.games(&GameFilter::default()).unwrap();
        assert_eq!(games.len(), 1);
        assert!(games.iter().all(|g| g.home_team_id != g.away_team_id));
    }

    #[tokio::test]
    async fn test_box_score_naming_one_team_twice_is_invalid() {
        let (store, ingestor) = setup();
        let mut record = BoxScoreRecord {
            date: NaiveDate::from_ymd_opt(2024, 11, 30),
            ..Default::default()
        };
        record.home.team_name = Some("Michigan".to_string());
        record.away.team_name = Some("Michigan Wolverines".to_string());
        record.home.metrics = BTreeMap::from([("points".to_string(), 21.0)]);

        let report = ingestor.ingest_box_score(&record).await.unwrap();
        assert_eq!(report.skipped_invalid, 1);
        assert_eq!(report.upserted, 0);
        assert!(store.games(&GameFilter::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_box_score_for_unknown_event_without_fields_is_invalid() {
        let (_, ingestor) = setup();
        let record = BoxScoreRecord {
            external_id: Some("999".to_string()),
            ..Default::default()
        };
        let report = ingestor.ingest_box_score(&record).await.unwrap();
        assert_eq!(report.skipped_invalid, 1);
    }
}

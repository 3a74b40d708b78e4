//! Durable store for teams, aliases, games, rating snapshots, per-game stat
//! lines and hypothetical predictions.
//!
//! Every write is an upsert keyed by the record's natural key. Optional
//! fields left as `None` keep whatever is already stored.

pub mod models;
pub mod sqlite;

pub use models::{
    Alias, Favorite, Game, GameFilter, GameId, GameUpsert, HypotheticalPrediction, NewTeam,
    RatingFilter, RatingSnapshot, RatingSystem, RecentGameStatLine, Team, TeamId,
};
pub use sqlite::SqliteStore;

use crate::error::AppError;

/// Storage seam used by ingestion, ratings, prediction and analytics.
///
/// Implementations must be safe to share across worker tasks.
pub trait Store: Send + Sync {
    /// Inserts or updates a team by case-insensitive name. Returns its id.
    fn upsert_team(&self, team: &NewTeam) -> Result<TeamId, AppError>;
    fn team(&self, id: TeamId) -> Result<Option<Team>, AppError>;
    fn teams(&self) -> Result<Vec<Team>, AppError>;

    /// Records an alias; an existing `(alias, source)` pair is repointed.
    fn upsert_alias(&self, alias: &Alias) -> Result<(), AppError>;
    fn aliases(&self) -> Result<Vec<Alias>, AppError>;

    /// Upserts on `(home_team_id, away_team_id, game_date)`.
    fn upsert_game(&self, game: &GameUpsert) -> Result<GameId, AppError>;
    fn game(&self, id: GameId) -> Result<Option<Game>, AppError>;
    fn game_by_external_id(&self, external_id: &str) -> Result<Option<Game>, AppError>;
    fn games(&self, filter: &GameFilter) -> Result<Vec<Game>, AppError>;

    /// Upserts on `(team_id, system, season, week)`.
    fn upsert_rating(&self, snapshot: &RatingSnapshot) -> Result<(), AppError>;
    /// Most recent snapshot for the season; weekly values win over the season-level one.
    fn latest_rating(
        &self,
        team_id: TeamId,
        system: RatingSystem,
        season: i32,
    ) -> Result<Option<RatingSnapshot>, AppError>;
    fn ratings(&self, filter: &RatingFilter) -> Result<Vec<RatingSnapshot>, AppError>;

    /// Upserts on `(team_id, game_id)`, merging metric maps.
    fn upsert_stat_line(&self, line: &RecentGameStatLine) -> Result<(), AppError>;
    /// Up to `limit` lines for the team, most recent first.
    fn recent_stat_lines(
        &self,
        team_id: TeamId,
        limit: usize,
    ) -> Result<Vec<RecentGameStatLine>, AppError>;

    /// One prediction per game; `created_at` survives updates.
    fn upsert_prediction(&self, prediction: &HypotheticalPrediction) -> Result<(), AppError>;
    fn prediction(&self, game_id: GameId) -> Result<Option<HypotheticalPrediction>, AppError>;
    fn predictions(&self, season: Option<i32>) -> Result<Vec<HypotheticalPrediction>, AppError>;
}

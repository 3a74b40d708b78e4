use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AppError;
use crate::store::{Game, GameId, RatingSnapshot, RatingSystem, Store, TeamId};

/// Where the aggregator reads games and rating snapshots from.
#[async_trait]
pub trait RatingSource: Send + Sync {
    async fn game(&self, game_id: GameId) -> Result<Option<Game>, AppError>;

    /// Latest snapshot of one system for a team in a season, if any
    async fn latest_rating(
        &self,
        team_id: TeamId,
        system: RatingSystem,
        season: i32,
    ) -> Result<Option<RatingSnapshot>, AppError>;
}

/// Reads straight from the durable store
#[derive(Clone)]
pub struct StoreRatingSource {
    store: Arc<dyn Store>,
}

impl StoreRatingSource {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RatingSource for StoreRatingSource {
    async fn game(&self, game_id: GameId) -> Result<Option<Game>, AppError> {
        self.store.game(game_id)
    }

    async fn latest_rating(
        &self,
        team_id: TeamId,
        system: RatingSystem,
        season: i32,
    ) -> Result<Option<RatingSnapshot>, AppError> {
        self.store.latest_rating(team_id, system, season)
    }
}

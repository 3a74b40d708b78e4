//! Rating aggregation: both teams of a game, every rating system, one bundle.

pub mod bundle;
pub mod source;

pub use bundle::{RatingsBundle, SystemRating, TeamRatings};
pub use source::{RatingSource, StoreRatingSource};

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::RatingsConfig;
use crate::data_fetcher::cache::TtlCache;
use crate::error::AppError;
use crate::ingest::CacheInvalidator;
use crate::store::{GameId, RatingSystem, TeamId};

fn cache_key(game_id: GameId) -> String {
    format!("ratings_{game_id}")
}

pub struct RatingAggregator {
    source: Arc<dyn RatingSource>,
    cache: TtlCache<String, RatingsBundle>,
}

impl RatingAggregator {
    pub fn new(source: Arc<dyn RatingSource>, config: &RatingsConfig) -> Self {
        Self {
            source,
            cache: TtlCache::new(
                "ratings",
                config.cache_capacity,
                Duration::from_secs(config.cache_ttl_seconds),
            ),
        }
    }

    /// Returns the cached bundle for a game, building it on a miss.
    ///
    /// Each `(team, system)` lookup runs concurrently; a failed lookup only
    /// marks that system unavailable. A bundle with a failed lookup is
    /// returned but not cached, so the next call looks again.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub async fn get_ratings(&self, game_id: GameId) -> Result<RatingsBundle, AppError> {
        let key = cache_key(game_id);
        if let Some(bundle) = self.cache.get(&key).await {
            return Ok(bundle);
        }

        let game = self
            .source
            .game(game_id)
            .await?
            .ok_or_else(|| AppError::game_not_found(game_id.0))?;
        let season = game.season;

        let lookups = [game.home_team_id, game.away_team_id]
            .into_iter()
            .flat_map(|team_id| RatingSystem::ALL.into_iter().map(move |system| (team_id, system)))
            .map(|(team_id, system)| async move {
                let result = self.source.latest_rating(team_id, system, season).await;
                (team_id, system, result)
            });

        let mut home = TeamRatings::new(game.home_team_id);
        let mut away = TeamRatings::new(game.away_team_id);
        let mut failed = 0usize;

        for (team_id, system, result) in join_all(lookups).await {
            let side = if team_id == game.home_team_id {
                &mut home
            } else {
                &mut away
            };
            match result {
                Ok(Some(snapshot)) => {
                    side.ratings.insert(system, snapshot.into());
                }
                Ok(None) => debug!("No {system} rating for team {team_id} in {season}"),
                Err(e) => {
                    warn!("{system} lookup failed for team {team_id}: {e}");
                    failed += 1;
                }
            }
        }

        let bundle = RatingsBundle::new(game_id, game.season, home, away);
        if !bundle.is_complete() {
            debug!(
                "Ratings for game {game_id} incomplete, missing: {:?}",
                bundle.missing_systems()
            );
        }

        if failed > 0 {
            warn!("Not caching ratings for game {game_id}: {failed} lookups failed");
        } else {
            self.cache.insert(key, bundle.clone()).await;
        }
        Ok(bundle)
    }

    /// True only when every system has a value for both teams
    pub async fn has_complete_ratings(&self, game_id: GameId) -> Result<bool, AppError> {
        Ok(self.get_ratings(game_id).await?.is_complete())
    }

    /// Evicts one game's bundle
    pub async fn refresh(&self, game_id: GameId) {
        self.cache.invalidate(&cache_key(game_id)).await;
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    /// Evicts every bundle involving the team. Returns how many were evicted.
    pub async fn invalidate_team(&self, team_id: TeamId) -> usize {
        let evicted = self
            .cache
            .invalidate_if(|_, bundle| bundle.involves(team_id))
            .await;
        if evicted > 0 {
            info!("Evicted {evicted} rating bundles for team {team_id}");
        }
        evicted
    }
}

#[async_trait]
impl CacheInvalidator for RatingAggregator {
    async fn invalidate_team(&self, team_id: TeamId) {
        RatingAggregator::invalidate_team(self, team_id).await;
    }
}

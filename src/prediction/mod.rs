//! Hypothetical predictions: created from complete rating bundles, graded
//! once the result is known, never deleted.

pub mod model;

pub use model::{favored, is_correct, predict, round_to, spread, win_probability};

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::PredictionConfig;
use crate::error::AppError;
use crate::ratings::{RatingAggregator, RatingsBundle};
use crate::store::{
    Favorite, Game, GameFilter, GameId, HypotheticalPrediction, RatingSystem, Store, TeamId,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Created { prediction: HypotheticalPrediction },
    /// Ratings incomplete; nothing was written
    Pending { missing: Vec<RatingSystem> },
    /// A team of the game is missing from the registry
    Unresolved { team_ids: Vec<TeamId> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GradeSummary {
    pub correct: usize,
    pub incorrect: usize,
    /// Push predictions and tied games
    pub no_decision: usize,
    /// Games not final yet
    pub pending: usize,
}

pub struct PredictionService {
    store: Arc<dyn Store>,
    aggregator: Arc<RatingAggregator>,
    config: PredictionConfig,
}

impl PredictionService {
    pub fn new(
        store: Arc<dyn Store>,
        aggregator: Arc<RatingAggregator>,
        config: PredictionConfig,
    ) -> Self {
        Self {
            store,
            aggregator,
            config,
        }
    }

    fn load_game(&self, game_id: GameId) -> Result<Game, AppError> {
        self.store
            .game(game_id)?
            .ok_or_else(|| AppError::game_not_found(game_id.0))
    }

    fn unknown_teams(&self, game: &Game) -> Result<Vec<TeamId>, AppError> {
        let mut missing = Vec::new();
        for team_id in [game.home_team_id, game.away_team_id] {
            if self.store.team(team_id)?.is_none() {
                missing.push(team_id);
            }
        }
        Ok(missing)
    }

    fn build(&self, game: &Game, bundle: &RatingsBundle) -> Option<HypotheticalPrediction> {
        let (home_a, away_a) = bundle.pair(self.config.dimension_a.system)?;
        let (home_b, away_b) = bundle.pair(self.config.dimension_b.system)?;

        let probability = predict(&self.config, home_a, away_a, home_b, away_b);
        let favored = favored(probability);
        let favored_team_id = match favored {
            Favorite::Home => Some(game.home_team_id),
            Favorite::Away => Some(game.away_team_id),
            Favorite::Push => None,
        };
        let now = Utc::now();

        Some(HypotheticalPrediction {
            game_id: game.id,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            home_rating_a: home_a,
            away_rating_a: away_a,
            home_rating_b: home_b,
            away_rating_b: away_b,
            home_win_probability: probability,
            spread: spread(&self.config, home_a, away_a, home_b, away_b),
            favored,
            favored_team_id,
            correct: game
                .final_score()
                .and_then(|(home, away)| is_correct(favored, home, away)),
            created_at: now,
            updated_at: now,
        })
    }

    /// Creates or refreshes the prediction for a game.
    ///
    /// Only a complete bundle produces a prediction; otherwise the missing
    /// systems are reported and the store is left untouched.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub async fn generate(&self, game_id: GameId) -> Result<PredictionOutcome, AppError> {
        let game = self.load_game(game_id)?;

        let unknown = self.unknown_teams(&game)?;
        if !unknown.is_empty() {
            warn!(target: "reconciliation", "Game {game_id} references unknown teams {unknown:?}");
            return Ok(PredictionOutcome::Unresolved { team_ids: unknown });
        }

        let bundle = self.aggregator.get_ratings(game_id).await?;
        if !bundle.is_complete() {
            let missing = bundle.missing_systems();
            info!("Prediction for game {game_id} pending, missing {missing:?}");
            return Ok(PredictionOutcome::Pending { missing });
        }

        let Some(prediction) = self.build(&game, &bundle) else {
            return Ok(PredictionOutcome::Pending {
                missing: vec![self.config.dimension_a.system, self.config.dimension_b.system],
            });
        };

        self.store.upsert_prediction(&prediction)?;
        let stored = self.store.prediction(game_id)?.unwrap_or(prediction);
        info!(
            "Prediction for game {game_id}: p_home={}, spread={}, favored={}",
            stored.home_win_probability,
            stored.spread,
            stored.favored.as_str()
        );
        Ok(PredictionOutcome::Created { prediction: stored })
    }

    /// Sets the correctness flag once the game is final.
    ///
    /// Returns `None` when no prediction exists for the game. A prediction
    /// whose game is still open is returned unchanged.
    #[instrument(skip(self), fields(game_id = %game_id))]
    pub fn grade(&self, game_id: GameId) -> Result<Option<HypotheticalPrediction>, AppError> {
        let Some(mut prediction) = self.store.prediction(game_id)? else {
            return Ok(None);
        };
        let game = self.load_game(game_id)?;
        let Some((home, away)) = game.final_score() else {
            return Ok(Some(prediction));
        };

        let correct = is_correct(prediction.favored, home, away);
        if prediction.correct != correct {
            prediction.correct = correct;
            prediction.updated_at = Utc::now();
            self.store.upsert_prediction(&prediction)?;
        }
        Ok(Some(prediction))
    }

    /// Grades every stored prediction of a season
    pub fn grade_season(&self, season: i32) -> Result<GradeSummary, AppError> {
        let mut summary = GradeSummary::default();
        let finals: Vec<GameId> = self
            .store
            .games(&GameFilter {
                season: Some(season),
                completed: Some(true),
                ..Default::default()
            })?
            .into_iter()
            .map(|game| game.id)
            .collect();

        for prediction in self.store.predictions(Some(season))? {
            if !finals.contains(&prediction.game_id) {
                summary.pending += 1;
                continue;
            }
            match self.grade(prediction.game_id) {
                Ok(Some(graded)) => match graded.correct {
                    Some(true) => summary.correct += 1,
                    Some(false) => summary.incorrect += 1,
                    None => summary.no_decision += 1,
                },
                Ok(None) => {}
                Err(e) => warn!("Failed to grade game {}: {e}", prediction.game_id),
            }
        }

        info!(
            "Graded season {season}: correct={}, incorrect={}, no_decision={}, pending={}",
            summary.correct, summary.incorrect, summary.no_decision, summary.pending
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingsConfig;
    use crate::ratings::StoreRatingSource;
    use crate::store::{GameUpsert, NewTeam, RatingSnapshot, SqliteStore};
    use chrono::NaiveDate;

    struct Fixture {
        store: Arc<SqliteStore>,
        service: PredictionService,
        game_id: GameId,
        home: TeamId,
        away: TeamId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let home = store.upsert_team(&NewTeam::named("Georgia")).unwrap();
        let away = store.upsert_team(&NewTeam::named("Alabama")).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 9, 28).unwrap();
        let game_id = store
            .upsert_game(&GameUpsert::new(2024, date, home, away))
            .unwrap();

        let aggregator = Arc::new(RatingAggregator::new(
            Arc::new(StoreRatingSource::new(store.clone())),
            &RatingsConfig::default(),
        ));
        let service = PredictionService::new(store.clone(), aggregator, PredictionConfig::default());
        Fixture {
            store,
            service,
            game_id,
            home,
            away,
        }
    }

    fn rate_all(store: &SqliteStore, home: TeamId, away: TeamId) {
        for system in RatingSystem::ALL {
            let (home_value, away_value) = match system {
                RatingSystem::Elo => (1600.0, 1500.0),
                RatingSystem::PowerIndex => (5.0, 3.0),
                _ => (1.0, 1.0),
            };
            store
                .upsert_rating(&RatingSnapshot::new(home, system, 2024, home_value))
                .unwrap();
            store
                .upsert_rating(&RatingSnapshot::new(away, system, 2024, away_value))
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_incomplete_ratings_are_pending() {
        let f = fixture();
        f.store
            .upsert_rating(&RatingSnapshot::new(f.home, RatingSystem::Elo, 2024, 1600.0))
            .unwrap();

        let outcome = f.service.generate(f.game_id).await.unwrap();
        let PredictionOutcome::Pending { missing } = outcome else {
            panic!("expected pending, got {outcome:?}");
        };
        assert_eq!(missing.len(), 5);
        assert!(f.store.prediction(f.game_id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_ratings_create_prediction() {
        let f = fixture();
        rate_all(&f.store, f.home, f.away);

        let outcome = f.service.generate(f.game_id).await.unwrap();
        let PredictionOutcome::Created { prediction } = outcome else {
            panic!("expected created, got {outcome:?}");
        };
        assert_eq!(prediction.home_win_probability, 0.6266);
        assert_eq!(prediction.spread, 3.0);
        assert_eq!(prediction.favored, Favorite::Home);
        assert_eq!(prediction.favored_team_id, Some(f.home));
        assert_eq!(prediction.correct, None);
    }

    #[tokio::test]
    async fn test_grade_after_final() {
        let f = fixture();
        rate_all(&f.store, f.home, f.away);
        f.service.generate(f.game_id).await.unwrap();

        // Not final yet
        let open = f.service.grade(f.game_id).unwrap().unwrap();
        assert_eq!(open.correct, None);

        let game = f.store.game(f.game_id).unwrap().unwrap();
        f.store
            .upsert_game(&GameUpsert {
                home_score: Some(27),
                away_score: Some(30),
                completed: Some(true),
                ..GameUpsert::new(game.season, game.game_date, f.home, f.away)
            })
            .unwrap();

        let graded = f.service.grade(f.game_id).unwrap().unwrap();
        assert_eq!(graded.correct, Some(false));

        let summary = f.service.grade_season(2024).unwrap();
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.correct, 0);
    }

    #[tokio::test]
    async fn test_unknown_game_is_an_error() {
        let f = fixture();
        let result = f.service.generate(GameId(999)).await;
        assert!(matches!(result, Err(AppError::GameNotFound { .. })));
        assert!(f.service.grade(GameId(999)).unwrap().is_none());
    }
}

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::data_fetcher::models::{RankingRecord, ScoreboardRecord};
use crate::error::AppError;
use crate::store::{
    GameId, GameUpsert, NewTeam, RatingSnapshot, RatingSystem, RecentGameStatLine, SqliteStore,
    Store, TeamId,
};

/// Test utilities for creating mock records and seeded stores
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Creates a team with provider-agnostic aliases
    pub fn team(name: &str, aliases: &[&str]) -> NewTeam {
        NewTeam {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..NewTeam::named(name)
        }
    }

    /// Creates a completed scoreboard record
    pub fn final_scoreboard_record(
        external_id: &str,
        date: NaiveDate,
        home: &str,
        away: &str,
        home_score: i64,
        away_score: i64,
    ) -> ScoreboardRecord {
        ScoreboardRecord {
            external_id: Some(external_id.to_string()),
            date: Some(date),
            completed: Some(true),
            home_name: Some(home.to_string()),
            away_name: Some(away.to_string()),
            home_score: Some(home_score),
            away_score: Some(away_score),
            ..Default::default()
        }
    }

    /// Creates a scheduled, not yet played scoreboard record
    pub fn scheduled_scoreboard_record(date: NaiveDate, home: &str, away: &str) -> ScoreboardRecord {
        ScoreboardRecord {
            date: Some(date),
            completed: Some(false),
            home_name: Some(home.to_string()),
            away_name: Some(away.to_string()),
            ..Default::default()
        }
    }

    /// Creates a rating table row
    pub fn ranking_row(team: &str, rank: u32, value: f64) -> RankingRecord {
        RankingRecord {
            team_name: Some(team.to_string()),
            rank: Some(rank),
            value: Some(value),
            ..Default::default()
        }
    }

    /// Creates a stat line carrying a single metric
    pub fn stat_line(
        team_id: TeamId,
        game_id: GameId,
        game_date: NaiveDate,
        metric: &str,
        value: f64,
    ) -> RecentGameStatLine {
        RecentGameStatLine {
            team_id,
            game_id,
            game_date,
            opponent_team_id: None,
            metrics: BTreeMap::from([(metric.to_string(), value)]),
        }
    }

    /// Writes a value for every rating system; Elo and the power index get
    /// the given values, the rest a neutral 1.0.
    pub fn rate_every_system(
        store: &dyn Store,
        team_id: TeamId,
        season: i32,
        elo: f64,
        power_index: f64,
    ) -> Result<(), AppError> {
        for system in RatingSystem::ALL {
            let value = match system {
                RatingSystem::Elo => elo,
                RatingSystem::PowerIndex => power_index,
                _ => 1.0,
            };
            store.upsert_rating(&RatingSnapshot::new(team_id, system, season, value))?;
        }
        Ok(())
    }

    /// In-memory store with two teams and one scheduled game between them.
    /// Returns `(store, home, away, game)`.
    pub fn seeded_store() -> Result<(SqliteStore, TeamId, TeamId, GameId), AppError> {
        let store = SqliteStore::open_in_memory()?;
        let home = store.upsert_team(&Self::team("Georgia", &["UGA"]))?;
        let away = store.upsert_team(&Self::team("Alabama", &["Bama"]))?;
        let date = NaiveDate::from_ymd_opt(2024, 9, 28)
            .ok_or_else(|| AppError::datetime_parse_error("invalid fixture date"))?;
        let game = store.upsert_game(&GameUpsert::new(2024, date, home, away))?;
        Ok((store, home, away, game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store() {
        let (store, home, away, game) = TestDataBuilder::seeded_store().unwrap();
        let stored = store.game(game).unwrap().unwrap();
        assert_eq!(stored.home_team_id, home);
        assert_eq!(stored.away_team_id, away);
        assert_eq!(store.aliases().unwrap().len(), 2);
    }

    #[test]
    fn test_rate_every_system() {
        let (store, home, _, _) = TestDataBuilder::seeded_store().unwrap();
        TestDataBuilder::rate_every_system(&store, home, 2024, 1600.0, 5.0).unwrap();
        let elo = store.latest_rating(home, RatingSystem::Elo, 2024).unwrap().unwrap();
        assert_eq!(elo.value, 1600.0);
    }
}

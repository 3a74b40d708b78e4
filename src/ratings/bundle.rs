use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::{GameId, RatingSnapshot, RatingSystem, TeamId};

/// One system's value for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRating {
    pub value: f64,
    pub week: Option<u32>,
    pub offense: Option<f64>,
    pub defense: Option<f64>,
    pub rank: Option<u32>,
}

impl From<RatingSnapshot> for SystemRating {
    fn from(snapshot: RatingSnapshot) -> Self {
        Self {
            value: snapshot.value,
            week: snapshot.week,
            offense: snapshot.offense,
            defense: snapshot.defense,
            rank: snapshot.rank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRatings {
    pub team_id: TeamId,
    /// Only systems with a value are present
    pub ratings: BTreeMap<RatingSystem, SystemRating>,
}

impl TeamRatings {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ratings: BTreeMap::new(),
        }
    }

    pub fn value(&self, system: RatingSystem) -> Option<f64> {
        self.ratings.get(&system).map(|r| r.value)
    }
}

/// Side-by-side ratings of both teams of a game, across every rating system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingsBundle {
    pub game_id: GameId,
    pub season: i32,
    pub home: TeamRatings,
    pub away: TeamRatings,
    /// True when the system has a value for both teams
    pub availability: BTreeMap<RatingSystem, bool>,
}

impl RatingsBundle {
    pub fn new(game_id: GameId, season: i32, home: TeamRatings, away: TeamRatings) -> Self {
        let availability = RatingSystem::ALL
            .iter()
            .map(|system| {
                let available = home.ratings.contains_key(system) && away.ratings.contains_key(system);
                (*system, available)
            })
            .collect();
        Self {
            game_id,
            season,
            home,
            away,
            availability,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home.team_id == team_id || self.away.team_id == team_id
    }

    pub fn is_available(&self, system: RatingSystem) -> bool {
        self.availability.get(&system).copied().unwrap_or(false)
    }

    /// Systems missing a value for at least one team
    pub fn missing_systems(&self) -> Vec<RatingSystem> {
        RatingSystem::ALL
            .into_iter()
            .filter(|system| !self.is_available(*system))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_systems().is_empty()
    }

    /// `(home, away)` values of one system when both exist
    pub fn pair(&self, system: RatingSystem) -> Option<(f64, f64)> {
        Some((self.home.value(system)?, self.away.value(system)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: f64) -> SystemRating {
        SystemRating {
            value,
            week: None,
            offense: None,
            defense: None,
            rank: None,
        }
    }

    #[test]
    fn test_availability_requires_both_teams() {
        let mut home = TeamRatings::new(TeamId(1));
        let mut away = TeamRatings::new(TeamId(2));
        home.ratings.insert(RatingSystem::Elo, rating(1600.0));
        away.ratings.insert(RatingSystem::Elo, rating(1500.0));
        home.ratings.insert(RatingSystem::PowerIndex, rating(5.0));

        let bundle = RatingsBundle::new(GameId(7), 2024, home, away);
        assert!(bundle.is_available(RatingSystem::Elo));
        assert!(!bundle.is_available(RatingSystem::PowerIndex));
        assert_eq!(bundle.pair(RatingSystem::Elo), Some((1600.0, 1500.0)));
        assert_eq!(bundle.pair(RatingSystem::PowerIndex), None);
        assert_eq!(bundle.missing_systems().len(), 4);
        assert!(!bundle.is_complete());
    }

    #[test]
    fn test_serializes_with_snake_case_system_keys() {
        let mut home = TeamRatings::new(TeamId(1));
        home.ratings.insert(RatingSystem::StrengthOfSchedule, rating(0.61));
        let bundle = RatingsBundle::new(GameId(7), 2024, home, TeamRatings::new(TeamId(2)));

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["home"]["ratings"]["strength_of_schedule"]["value"], 0.61);
        assert_eq!(json["availability"]["elo"], false);
    }
}

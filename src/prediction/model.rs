//! Win probability and spread from two independent rating dimensions.
//!
//! Every function here is pure; calibration comes from [`PredictionConfig`].

use crate::config::PredictionConfig;
use crate::store::Favorite;

/// Rounds half away from zero to `places` decimals
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Logistic home-win probability for one dimension:
/// `1 / (1 + 10^((away - home) / scale))`
pub fn win_probability(home: f64, away: f64, scale: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((away - home) / scale))
}

/// Blended home-win probability: mean of both dimensions, rounded.
///
/// ```
/// use sports_ratings::config::PredictionConfig;
/// use sports_ratings::prediction::predict;
///
/// let config = PredictionConfig::default();
/// let p = predict(&config, 1600.0, 1500.0, 5.0, 3.0);
/// assert_eq!(p, 0.6266);
/// ```
pub fn predict(
    config: &PredictionConfig,
    home_a: f64,
    away_a: f64,
    home_b: f64,
    away_b: f64,
) -> f64 {
    let p_a = win_probability(home_a, away_a, config.dimension_a.scale);
    let p_b = win_probability(home_b, away_b, config.dimension_b.scale);
    round_to((p_a + p_b) / 2.0, config.probability_precision)
}

/// Expected home margin in points. Positive favors the home side.
pub fn spread(config: &PredictionConfig, home_a: f64, away_a: f64, home_b: f64, away_b: f64) -> f64 {
    let margin_a = (home_a - away_a) * config.dimension_a.points_per_rating;
    let margin_b = (home_b - away_b) * config.dimension_b.points_per_rating;
    round_to(
        (margin_a + margin_b) / 2.0 + config.home_field_points,
        config.spread_precision,
    )
}

pub fn favored(home_win_probability: f64) -> Favorite {
    if home_win_probability > 0.5 {
        Favorite::Home
    } else if home_win_probability < 0.5 {
        Favorite::Away
    } else {
        Favorite::Push
    }
}

/// Whether the favorite won. `None` for a push or a tie.
pub fn is_correct(favored: Favorite, home_score: i64, away_score: i64) -> Option<bool> {
    if home_score == away_score {
        return None;
    }
    let home_won = home_score > away_score;
    match favored {
        Favorite::Home => Some(home_won),
        Favorite::Away => Some(!home_won),
        Favorite::Push => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PredictionConfig {
        PredictionConfig::default()
    }

    #[test]
    fn test_single_dimension_probabilities() {
        assert_eq!(round_to(win_probability(1600.0, 1500.0, 400.0), 4), 0.6401);
        assert_eq!(round_to(win_probability(5.0, 3.0, 10.0), 4), 0.6131);
        assert_eq!(win_probability(1500.0, 1500.0, 400.0), 0.5);
    }

    #[test]
    fn test_blended_probability_favors_home() {
        let p = predict(&config(), 1600.0, 1500.0, 5.0, 3.0);
        assert_eq!(p, 0.6266);
        assert_eq!(favored(p), Favorite::Home);
    }

    #[test]
    fn test_predict_is_symmetric() {
        let pairs = [
            (1600.0, 1500.0, 5.0, 3.0),
            (1420.0, 1710.0, -2.5, 8.0),
            (1500.0, 1500.0, 0.0, 0.0),
            (1850.0, 1500.0, 12.0, -4.0),
        ];
        for (home_a, away_a, home_b, away_b) in pairs {
            let p = predict(&config(), home_a, away_a, home_b, away_b);
            let swapped = predict(&config(), away_a, home_a, away_b, home_b);
            assert!((0.0..=1.0).contains(&p));
            assert!((p + swapped - 1.0).abs() < 1e-9, "{p} + {swapped}");
        }
    }

    #[test]
    fn test_equal_ratings_are_a_push() {
        let p = predict(&config(), 1500.0, 1500.0, 4.0, 4.0);
        assert_eq!(p, 0.5);
        assert_eq!(favored(p), Favorite::Push);
    }

    #[test]
    fn test_spread() {
        // 100 Elo points at 1/25 and 2 index points at 1.0, averaged
        assert_eq!(spread(&config(), 1600.0, 1500.0, 5.0, 3.0), 3.0);
        assert_eq!(spread(&config(), 1500.0, 1600.0, 3.0, 5.0), -3.0);

        let mut with_home_field = config();
        with_home_field.home_field_points = 2.5;
        assert_eq!(spread(&with_home_field, 1500.0, 1500.0, 3.0, 3.0), 2.5);
    }

    #[test]
    fn test_grading() {
        assert_eq!(is_correct(Favorite::Home, 24, 17), Some(true));
        assert_eq!(is_correct(Favorite::Home, 17, 24), Some(false));
        assert_eq!(is_correct(Favorite::Away, 17, 24), Some(true));
        assert_eq!(is_correct(Favorite::Push, 17, 24), None);
        assert_eq!(is_correct(Favorite::Home, 21, 21), None);
    }
}

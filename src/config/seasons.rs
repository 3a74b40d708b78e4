//! Season calendar: maps calendar dates to a season year and week number.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekRange {
    pub week: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonConfig {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub weeks: Vec<WeekRange>,
}

impl SeasonConfig {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Week whose inclusive range contains `date`
    pub fn week_for_date(&self, date: NaiveDate) -> Option<u32> {
        self.weeks
            .iter()
            .find(|w| w.start <= date && date <= w.end)
            .map(|w| w.week)
    }
}

/// Season year for `date`. Dates outside every configured season fall back to
/// the football convention: January through July belong to the previous year.
pub fn season_for_date(seasons: &[SeasonConfig], date: NaiveDate) -> i32 {
    use chrono::Datelike;

    seasons
        .iter()
        .find(|s| s.contains(date))
        .map(|s| s.year)
        .unwrap_or_else(|| {
            if date.month() < 8 {
                date.year() - 1
            } else {
                date.year()
            }
        })
}

/// Week number for `date`, if a configured season defines one
pub fn week_for_date(seasons: &[SeasonConfig], date: NaiveDate) -> Option<u32> {
    seasons
        .iter()
        .find(|s| s.contains(date))
        .and_then(|s| s.week_for_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn season_2024() -> SeasonConfig {
        SeasonConfig {
            year: 2024,
            start: date("2024-08-24"),
            end: date("2025-01-20"),
            weeks: vec![
                WeekRange {
                    week: 1,
                    start: date("2024-08-24"),
                    end: date("2024-09-02"),
                },
                WeekRange {
                    week: 2,
                    start: date("2024-09-03"),
                    end: date("2024-09-09"),
                },
            ],
        }
    }

    #[test]
    fn test_week_lookup_inside_season() {
        let seasons = vec![season_2024()];
        assert_eq!(week_for_date(&seasons, date("2024-08-31")), Some(1));
        assert_eq!(week_for_date(&seasons, date("2024-09-07")), Some(2));
        assert_eq!(week_for_date(&seasons, date("2024-10-01")), None);
    }

    #[test]
    fn test_season_lookup_crosses_new_year() {
        let seasons = vec![season_2024()];
        assert_eq!(season_for_date(&seasons, date("2025-01-10")), 2024);
    }

    #[test]
    fn test_season_fallback_without_calendar() {
        assert_eq!(season_for_date(&[], date("2023-11-25")), 2023);
        assert_eq!(season_for_date(&[], date("2024-01-01")), 2023);
    }

    #[test]
    fn test_season_parses_from_toml() {
        let toml_str = r#"
year = 2024
start = "2024-08-24"
end = "2025-01-20"

[[weeks]]
week = 1
start = "2024-08-24"
end = "2024-09-02"
"#;
        let season: SeasonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(season.year, 2024);
        assert_eq!(season.weeks.len(), 1);
        assert!(season.contains(date("2024-12-01")));
    }
}

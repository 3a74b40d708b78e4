//! URL building utilities for provider endpoints

use chrono::NaiveDate;

fn join_query(base: &str, query: &str) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

/// Builds a scoreboard URL for one calendar day.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use sports_ratings::data_fetcher::api::build_scoreboard_url;
///
/// let date = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap();
/// let url = build_scoreboard_url("https://api.example.com/scoreboard", date);
/// assert_eq!(url, "https://api.example.com/scoreboard?dates=20240907");
/// ```
pub fn build_scoreboard_url(scoreboard_url: &str, date: NaiveDate) -> String {
    join_query(scoreboard_url, &format!("dates={}", date.format("%Y%m%d")))
}

/// Builds one page of the paginated ratings API.
///
/// # Example
/// ```
/// use sports_ratings::data_fetcher::api::build_ratings_api_url;
///
/// let url = build_ratings_api_url("https://stats.example.com/ratings", 2024, 2);
/// assert_eq!(url, "https://stats.example.com/ratings?season=2024&page=2");
///
/// let url = build_ratings_api_url("https://stats.example.com/ratings?key=abc", 2024, 1);
/// assert_eq!(url, "https://stats.example.com/ratings?key=abc&season=2024&page=1");
/// ```
pub fn build_ratings_api_url(ratings_api_url: &str, season: i32, page: u32) -> String {
    join_query(ratings_api_url, &format!("season={season}&page={page}"))
}

/// Builds the box score summary document URL for an event.
///
/// # Example
/// ```
/// use sports_ratings::data_fetcher::api::build_box_score_summary_url;
///
/// let url = build_box_score_summary_url("https://api.example.com/cfb", "401628374");
/// assert_eq!(url, "https://api.example.com/cfb/summary?event=401628374");
/// ```
pub fn build_box_score_summary_url(box_score_url: &str, event_id: &str) -> String {
    format!("{}/summary?event={event_id}", box_score_url.trim_end_matches('/'))
}

/// Builds the box score linescore document URL for an event.
///
/// # Example
/// ```
/// use sports_ratings::data_fetcher::api::build_box_score_linescore_url;
///
/// let url = build_box_score_linescore_url("https://api.example.com/cfb/", "401628374");
/// assert_eq!(url, "https://api.example.com/cfb/linescore?event=401628374");
/// ```
pub fn build_box_score_linescore_url(box_score_url: &str, event_id: &str) -> String {
    format!("{}/linescore?event={event_id}", box_score_url.trim_end_matches('/'))
}

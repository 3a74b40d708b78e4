use chrono::NaiveDate;
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::data_fetcher::api::{build_scoreboard_url, fetch_json};
use crate::data_fetcher::models::common::fragment;
use crate::data_fetcher::models::{ScoreboardEvent, ScoreboardRecord, ScoreboardResponse};
use crate::error::AppError;

/// Fetches every event on the scoreboard for `date`.
///
/// Events that fail to deserialize are skipped and logged with a raw
/// fragment; a failed request is returned as an error.
#[instrument(skip(client))]
pub async fn fetch_scoreboard(
    client: &Client,
    scoreboard_url: &str,
    date: NaiveDate,
) -> Result<Vec<ScoreboardRecord>, AppError> {
    if scoreboard_url.is_empty() {
        return Err(AppError::config_error("sources.scoreboard_url is not configured"));
    }

    let url = build_scoreboard_url(scoreboard_url, date);
    let response: ScoreboardResponse = fetch_json(client, &url).await?;

    let records = parse_events(response, &url);
    info!("Fetched {} scoreboard events for {}", records.len(), date);
    Ok(records)
}

fn parse_events(response: ScoreboardResponse, url: &str) -> Vec<ScoreboardRecord> {
    response
        .events
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<ScoreboardEvent>(raw.clone()) {
            Ok(event) => Some(ScoreboardRecord::from(event)),
            Err(e) => {
                warn!(
                    url = %url,
                    raw = %fragment(&raw, 200),
                    "Skipping malformed scoreboard event: {e}"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_scoreboard_skips_malformed_event() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scoreboard"))
            .and(query_param("dates", "20241130"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "events": [
                    {
                        "id": "401",
                        "date": "2024-11-30T17:00Z",
                        "competitions": [{ "competitors": [
                            { "homeAway": "home", "score": "10", "team": { "displayName": "Ohio State" } },
                            { "homeAway": "away", "score": "13", "team": { "displayName": "Michigan" } }
                        ]}]
                    },
                    { "id": 17, "competitions": "not a list" }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let url = format!("{}/scoreboard", mock_server.uri());
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        let records = fetch_scoreboard(&client, &url, date).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].home_name.as_deref(), Some("Ohio State"));
        assert_eq!(records[0].away_score, Some(13));
    }

    #[tokio::test]
    async fn test_fetch_scoreboard_propagates_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scoreboard"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let url = format!("{}/scoreboard", mock_server.uri());
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        let result = fetch_scoreboard(&client, &url, date).await;
        assert!(matches!(result, Err(AppError::ApiNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unconfigured_scoreboard_is_config_error() {
        let client = create_test_http_client();
        let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
        let result = fetch_scoreboard(&client, "", date).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{instrument, warn};

use crate::data_fetcher::api::{
    build_box_score_linescore_url, build_box_score_summary_url, fetch_json,
};
use crate::data_fetcher::models::{BoxScoreRecord, BoxScoreSummary, Linescore};
use crate::error::AppError;

/// Fetches one sub-document under its own timeout
async fn fetch_part<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    limit: Duration,
) -> Result<T, AppError> {
    match timeout(limit, fetch_json::<T>(client, url)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::network_timeout(url)),
    }
}

/// Fetches the `summary` and `linescore` documents of an event concurrently
/// and joins them.
///
/// A failure or timeout of one document only blanks the fields it carries.
/// When both fail, the summary error is returned.
#[instrument(skip(client))]
pub async fn fetch_box_score(
    client: &Client,
    box_score_url: &str,
    event_id: &str,
    sub_fetch_timeout: Duration,
) -> Result<BoxScoreRecord, AppError> {
    if box_score_url.is_empty() {
        return Err(AppError::config_error("sources.box_score_url is not configured"));
    }

    let summary_url = build_box_score_summary_url(box_score_url, event_id);
    let linescore_url = build_box_score_linescore_url(box_score_url, event_id);

    let (summary, linescore) = tokio::join!(
        fetch_part::<BoxScoreSummary>(client, &summary_url, sub_fetch_timeout),
        fetch_part::<Linescore>(client, &linescore_url, sub_fetch_timeout),
    );

    let (summary, linescore) = match (summary, linescore) {
        (Err(summary_err), Err(linescore_err)) => {
            warn!(
                "Both box score documents failed for event {event_id}: summary={summary_err}, linescore={linescore_err}"
            );
            return Err(summary_err);
        }
        (summary, linescore) => (
            summary
                .inspect_err(|e| warn!("Box score summary unavailable for event {event_id}: {e}"))
                .ok(),
            linescore
                .inspect_err(|e| warn!("Box score linescore unavailable for event {event_id}: {e}"))
                .ok(),
        ),
    };

    Ok(BoxScoreRecord::join(event_id, summary, linescore))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn summary_body() -> serde_json::Value {
        json!({
            "header": { "id": "401", "competitions": [{ "date": "2024-11-30T17:00Z" }] },
            "boxscore": { "teams": [
                { "homeAway": "home", "team": { "displayName": "Ohio State" },
                  "statistics": [{ "name": "totalYards", "displayValue": "452" }] },
                { "homeAway": "away", "team": { "displayName": "Michigan" },
                  "statistics": [{ "name": "totalYards", "displayValue": "301" }] }
            ]}
        })
    }

    async fn mount_summary(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/cfb/summary"))
            .and(query_param("event", "401"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_joins_both_documents() {
        let mock_server = MockServer::start().await;
        mount_summary(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/cfb/linescore"))
            .and(query_param("event", "401"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [
                { "homeAway": "home", "score": 10 },
                { "homeAway": "away", "score": 13 }
            ]})))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let base = format!("{}/cfb", mock_server.uri());
        let record = fetch_box_score(&client, &base, "401", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(record.home.team_name.as_deref(), Some("Ohio State"));
        assert_eq!(record.home_score, Some(10));
        assert_eq!(record.away.metrics.get("points"), Some(&13.0));
    }

    #[tokio::test]
    async fn test_slow_linescore_degrades_to_none() {
        let mock_server = MockServer::start().await;
        mount_summary(&mock_server).await;
        Mock::given(method("GET"))
            .and(path("/cfb/linescore"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "teams": [] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let base = format!("{}/cfb", mock_server.uri());
        let record = fetch_box_score(&client, &base, "401", Duration::from_millis(200))
            .await
            .unwrap();

        assert!(record.summary_available);
        assert!(!record.linescore_available);
        assert_eq!(record.home_score, None);
        assert_eq!(record.home.metrics.get("total_yards"), Some(&452.0));
    }

    #[tokio::test]
    async fn test_both_documents_failing_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let base = format!("{}/cfb", mock_server.uri());
        let result = fetch_box_score(&client, &base, "401", Duration::from_secs(5)).await;
        assert!(matches!(result, Err(AppError::ApiNotFound { .. })));
    }
}

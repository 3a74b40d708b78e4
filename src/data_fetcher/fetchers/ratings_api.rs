use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::data_fetcher::api::{build_ratings_api_url, fetch_json};
use crate::data_fetcher::models::common::fragment;
use crate::data_fetcher::models::{AdvancedRatingRecord, RatingsApiEntry, RatingsApiPage};
use crate::error::AppError;

/// Upper bound on pages fetched in one run, guarding against a provider
/// that never reports a page count.
const MAX_PAGES: u32 = 200;

/// Fetches every page of the advanced ratings API for `season`.
///
/// Pages are requested from 1 until the provider-reported `pageCount` is
/// exhausted. Without a page count, paging stops at the first empty page.
#[instrument(skip(client))]
pub async fn fetch_ratings_api(
    client: &Client,
    ratings_api_url: &str,
    season: i32,
) -> Result<Vec<AdvancedRatingRecord>, AppError> {
    if ratings_api_url.is_empty() {
        return Err(AppError::config_error("sources.ratings_api_url is not configured"));
    }

    let mut records = Vec::new();
    let mut page = 1u32;

    loop {
        let url = build_ratings_api_url(ratings_api_url, season, page);
        let response: RatingsApiPage = fetch_json(client, &url).await?;
        let entries = response.data.len();
        debug!("Ratings API page {page}: {entries} entries");

        for raw in response.data {
            match serde_json::from_value::<RatingsApiEntry>(raw.clone()) {
                Ok(entry) => records.push(AdvancedRatingRecord::from(entry)),
                Err(e) => warn!(
                    url = %url,
                    raw = %fragment(&raw, 200),
                    "Skipping malformed ratings entry: {e}"
                ),
            }
        }

        let more = match response.page_count {
            Some(count) => page < count,
            None => entries > 0,
        };
        if !more {
            break;
        }
        if page >= MAX_PAGES {
            warn!("Ratings API paging stopped at {MAX_PAGES} pages for {ratings_api_url}");
            break;
        }
        page += 1;
    }

    info!(
        "Fetched {} advanced rating entries across {} page(s) for season {}",
        records.len(),
        page,
        season
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetches_every_page() {
        let mock_server = MockServer::start().await;
        for (page, team) in [("1", "Georgia"), ("2", "Texas"), ("3", "Oregon")] {
            Mock::given(method("GET"))
                .and(path("/ratings"))
                .and(query_param("season", "2024"))
                .and(query_param("page", page))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "page": page.parse::<u32>().unwrap(),
                    "pageCount": 3,
                    "data": [{ "team": team, "efficiency": 20.5, "strengthOfSchedule": 0.55 }]
                })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let client = create_test_http_client();
        let url = format!("{}/ratings", mock_server.uri());
        let records = fetch_ratings_api(&client, &url, 2024).await.unwrap();

        let teams: Vec<_> = records.iter().filter_map(|r| r.team_name.as_deref()).collect();
        assert_eq!(teams, vec!["Georgia", "Texas", "Oregon"]);
    }

    #[tokio::test]
    async fn test_without_page_count_stops_at_empty_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ratings"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "team": "Army", "efficiency": "12.0" }, "garbage"]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ratings"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let url = format!("{}/ratings", mock_server.uri());
        let records = fetch_ratings_api(&client, &url, 2024).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].efficiency, Some(12.0));
    }

    #[tokio::test]
    async fn test_page_error_is_returned() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ratings"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let url = format!("{}/ratings", mock_server.uri());
        let result = fetch_ratings_api(&client, &url, 2024).await;
        assert!(matches!(result, Err(AppError::ApiClientError { status: 401, .. })));
    }
}

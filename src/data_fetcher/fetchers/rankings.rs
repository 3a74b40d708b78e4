use reqwest::Client;
use tracing::{info, instrument, warn};

use super::html::{cell, table_rows};
use crate::config::RatingsTableConfig;
use crate::data_fetcher::api::fetch_text;
use crate::data_fetcher::models::RankingRecord;
use crate::data_fetcher::models::common::parse_number;
use crate::error::AppError;

/// Fetches and parses one HTML rating table.
#[instrument(skip(client, table))]
pub async fn fetch_rankings_page(
    client: &Client,
    url: &str,
    table: &RatingsTableConfig,
) -> Result<Vec<RankingRecord>, AppError> {
    let html = fetch_text(client, url).await?;
    let records = parse_rankings_html(&html, table, url)?;
    info!("Parsed {} rating rows from {}", records.len(), url);
    Ok(records)
}

/// Extracts rating rows using the configured row selector and column layout.
/// Rows without a team name are skipped and logged.
pub fn parse_rankings_html(
    html: &str,
    table: &RatingsTableConfig,
    url: &str,
) -> Result<Vec<RankingRecord>, AppError> {
    let rows = table_rows(html, &table.row_selector, url)?;
    if rows.is_empty() {
        warn!(url = %url, selector = %table.row_selector, "Rating table selector matched no rows");
    }

    let number_at = |cells: &[String], column: Option<usize>| {
        column.and_then(|c| cell(cells, c)).and_then(parse_number)
    };

    let mut records = Vec::with_capacity(rows.len());
    for (cells, fragment) in rows {
        let Some(team_name) = cell(&cells, table.team_column) else {
            warn!(url = %url, raw = %fragment, "Skipping rating row without team name");
            continue;
        };

        records.push(RankingRecord {
            team_name: Some(team_name.to_string()),
            rank: number_at(&cells, table.rank_column)
                .filter(|r| *r >= 1.0)
                .map(|r| r as u32),
            value: number_at(&cells, Some(table.value_column)),
            offense: number_at(&cells, table.offense_column),
            defense: number_at(&cells, table.defense_column),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
        <table class="ratings">
          <thead><tr><th>Rk</th><th>Team</th><th>Rating</th><th>Off</th><th>Def</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>Georgia</td><td>1,702.4</td><td>35.1</td><td>12.0</td></tr>
            <tr><td>2</td><td>Ohio State</td><td>1,688.0</td><td>33.9</td><td>11.2</td></tr>
            <tr><td>3</td><td></td><td>1,650.0</td><td></td><td></td></tr>
            <tr><td>4</td><td>Oregon</td><td>n/a</td><td></td><td></td></tr>
          </tbody>
        </table>
        </body></html>"#;

    fn table() -> RatingsTableConfig {
        RatingsTableConfig {
            offense_column: Some(3),
            defense_column: Some(4),
            ..RatingsTableConfig::default()
        }
    }

    #[test]
    fn test_parse_rankings_rows() {
        let records = parse_rankings_html(PAGE, &table(), "url").unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].team_name.as_deref(), Some("Georgia"));
        assert_eq!(records[0].rank, Some(1));
        assert_eq!(records[0].value, Some(1702.4));
        assert_eq!(records[0].offense, Some(35.1));
        assert_eq!(records[1].defense, Some(11.2));
        // Unparseable rating degrades to None instead of dropping the row
        assert_eq!(records[2].team_name.as_deref(), Some("Oregon"));
        assert_eq!(records[2].value, None);
    }

    #[test]
    fn test_selector_matching_nothing_yields_empty() {
        let mut config = table();
        config.row_selector = "table.missing tr".to_string();
        assert!(parse_rankings_html(PAGE, &config, "url").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rankings_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/elo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&mock_server)
            .await;

        let client = create_test_http_client();
        let url = format!("{}/elo", mock_server.uri());
        let records = fetch_rankings_page(&client, &url, &table()).await.unwrap();
        assert_eq!(records.len(), 3);
    }
}

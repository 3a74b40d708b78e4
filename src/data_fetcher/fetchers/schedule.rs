use chrono::NaiveDate;
use reqwest::Client;
use tracing::{info, instrument, warn};

use super::html::{cell, table_rows};
use crate::config::ScheduleTableConfig;
use crate::data_fetcher::api::fetch_text;
use crate::data_fetcher::models::ScheduleRecord;
use crate::data_fetcher::models::common::{parse_event_date, parse_number};
use crate::error::AppError;

#[instrument(skip(client, table))]
pub async fn fetch_schedule(
    client: &Client,
    url: &str,
    table: &ScheduleTableConfig,
) -> Result<Vec<ScheduleRecord>, AppError> {
    if url.is_empty() {
        return Err(AppError::config_error("sources.schedule_url is not configured"));
    }
    let html = fetch_text(client, url).await?;
    let records = parse_schedule_html(&html, table, url)?;
    info!("Parsed {} schedule rows from {}", records.len(), url);
    Ok(records)
}

/// Extracts schedule rows. Rows missing either team are skipped and logged;
/// dates fall back to ISO parsing when the configured format does not match.
pub fn parse_schedule_html(
    html: &str,
    table: &ScheduleTableConfig,
    url: &str,
) -> Result<Vec<ScheduleRecord>, AppError> {
    let rows = table_rows(html, &table.row_selector, url)?;

    let score_at = |cells: &[String], column: Option<usize>| {
        column
            .and_then(|c| cell(cells, c))
            .and_then(parse_number)
            .map(|s| s.round() as i64)
    };

    let mut records = Vec::with_capacity(rows.len());
    for (cells, fragment) in rows {
        let (Some(away), Some(home)) = (
            cell(&cells, table.away_column),
            cell(&cells, table.home_column),
        ) else {
            warn!(url = %url, raw = %fragment, "Skipping schedule row without both teams");
            continue;
        };

        let date = cell(&cells, table.date_column).and_then(|text| {
            NaiveDate::parse_from_str(text, &table.date_format)
                .ok()
                .or_else(|| parse_event_date(text))
        });

        records.push(ScheduleRecord {
            date,
            away_name: Some(away.to_string()),
            home_name: Some(home.to_string()),
            away_score: score_at(&cells, table.away_score_column),
            home_score: score_at(&cells, table.home_score_column),
        });
    }

    Ok(records)
}

//! Provider fetchers. Each yields typed-optional records; malformed records
//! are skipped and logged, request-level failures are returned.

pub mod box_score;
mod html;
pub mod rankings;
pub mod ratings_api;
pub mod schedule;
pub mod scoreboard;

pub use box_score::fetch_box_score;
pub use rankings::{fetch_rankings_page, parse_rankings_html};
pub use ratings_api::fetch_ratings_api;
pub use schedule::{fetch_schedule, parse_schedule_html};
pub use scoreboard::fetch_scoreboard;

use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;

use crate::config::{HttpConfig, SourcesConfig};
use crate::data_fetcher::api::create_http_client;
use crate::data_fetcher::models::{
    AdvancedRatingRecord, BoxScoreRecord, RankingRecord, ScheduleRecord, ScoreboardRecord,
};
use crate::error::AppError;
use crate::store::RatingSystem;

/// Shared HTTP client bound to the configured provider endpoints.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
    sources: SourcesConfig,
    sub_fetch_timeout: Duration,
}

impl SourceFetcher {
    pub fn new(http: &HttpConfig, sources: SourcesConfig) -> Result<Self, AppError> {
        Ok(Self {
            client: create_http_client(http)?,
            sources,
            sub_fetch_timeout: Duration::from_secs(http.sub_fetch_timeout_seconds),
        })
    }

    pub fn sources(&self) -> &SourcesConfig {
        &self.sources
    }

    pub async fn scoreboard(&self, date: NaiveDate) -> Result<Vec<ScoreboardRecord>, AppError> {
        fetch_scoreboard(&self.client, &self.sources.scoreboard_url, date).await
    }

    /// Rating table for `system`, from its configured rankings page
    pub async fn rankings(&self, system: RatingSystem) -> Result<Vec<RankingRecord>, AppError> {
        let url = self.sources.rankings_pages.get(&system).ok_or_else(|| {
            AppError::config_error(format!("No rankings page configured for {system}"))
        })?;
        fetch_rankings_page(&self.client, url, &self.sources.rankings_table).await
    }

    pub async fn ratings_api(&self, season: i32) -> Result<Vec<AdvancedRatingRecord>, AppError> {
        fetch_ratings_api(&self.client, &self.sources.ratings_api_url, season).await
    }

    pub async fn schedule(&self) -> Result<Vec<ScheduleRecord>, AppError> {
        fetch_schedule(
            &self.client,
            &self.sources.schedule_url,
            &self.sources.schedule_table,
        )
        .await
    }

    pub async fn box_score(&self, event_id: &str) -> Result<BoxScoreRecord, AppError> {
        fetch_box_score(
            &self.client,
            &self.sources.box_score_url,
            event_id,
            self.sub_fetch_timeout,
        )
        .await
    }
}

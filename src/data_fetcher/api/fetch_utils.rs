//! Generic HTTP fetching utilities with error classification

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

use crate::error::AppError;

/// Fetches a URL and returns the response body as text.
///
/// One request per call. Transient failures (429, 5xx, timeouts, refused
/// connections) come back as retryable `AppError` variants; retrying is up
/// to the task queue.
///
/// # Arguments
/// * `client` - HTTP client for making requests
/// * `url` - URL to fetch data from
#[instrument(skip(client))]
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, AppError> {
    info!("Fetching data from URL: {url}");

    let response = client.get(url).send().await.map_err(|e| {
        error!("Request failed for URL {}: {}", url, e);
        if e.is_timeout() {
            AppError::network_timeout(url)
        } else if e.is_connect() {
            AppError::network_connection(url, e.to_string())
        } else {
            AppError::ApiFetch(e)
        }
    })?;

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            429 => AppError::api_rate_limit(reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = response.text().await.map_err(|e| {
        error!("Failed to read response text from URL {}: {}", url, e);
        AppError::ApiFetch(e)
    })?;

    debug!("Response length: {} bytes", response_text.len());
    Ok(response_text)
}

/// Fetches a URL and deserializes the JSON body into `T`.
///
/// Parse failures are classified: an empty body is `ApiNoData`, a body that
/// is not JSON at all is `ApiMalformedJson`, anything else is
/// `ApiUnexpectedStructure`.
#[instrument(skip(client))]
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, AppError> {
    let response_text = fetch_text(client, url).await?;
    parse_json(&response_text, url)
}

pub(crate) fn parse_json<T: DeserializeOwned>(response_text: &str, url: &str) -> Result<T, AppError> {
    match serde_json::from_str::<T>(response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            error!("Failed to parse API response: {} (URL: {})", e, url);
            error!(
                "Response text (first 200 chars): {}",
                response_text.chars().take(200).collect::<String>()
            );

            if response_text.trim().is_empty() {
                Err(AppError::api_no_data("Response body is empty", url))
            } else if !response_text.trim_start().starts_with('{')
                && !response_text.trim_start().starts_with('[')
            {
                Err(AppError::api_malformed_json(
                    "Response is not valid JSON",
                    url,
                ))
            } else {
                Err(AppError::api_unexpected_structure(e.to_string(), url))
            }
        }
    }
}

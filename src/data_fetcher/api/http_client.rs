//! HTTP client creation and configuration utilities

use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;

/// Creates a configured HTTP client with connection pooling and a request timeout.
///
/// # Features
/// * Timeout applied to every request (`http.timeout_seconds`)
/// * Connection pooling with centralized pool size configuration
/// * Provider-facing user agent
/// * Retry of transient failures is done by the fetch functions
pub fn create_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .user_agent(config.user_agent.clone())
        .build()
}

/// Creates an HTTP client with default settings and the given timeout
pub fn create_http_client_with_timeout(timeout_seconds: u64) -> Result<Client, reqwest::Error> {
    create_http_client(&HttpConfig {
        timeout_seconds,
        ..HttpConfig::default()
    })
}

/// Creates an HTTP client for testing with default timeout
#[cfg(test)]
pub fn create_test_http_client() -> Client {
    create_http_client_with_timeout(crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS)
        .expect("Failed to create test HTTP client")
}

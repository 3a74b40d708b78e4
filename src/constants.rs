//! Application-wide constants and default configuration values
//!
//! Every tunable here is only a default: the matching field in `Config`
//! overrides it at runtime.

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 16;

/// User agent sent with every provider request
pub const DEFAULT_USER_AGENT: &str = concat!("sports_ratings/", env!("CARGO_PKG_VERSION"));

/// Cache TTL (Time To Live) values in seconds
pub mod cache_ttl {
    /// TTL for blended rating bundles (1 hour)
    pub const RATINGS_BUNDLE_SECONDS: u64 = 3600;

    /// TTL for team analytics results (15 minutes)
    pub const ANALYTICS_SECONDS: u64 = 900;
}

/// LRU capacities for the in-process caches
pub mod cache_capacity {
    pub const RATINGS_BUNDLES: usize = 512;
    pub const ANALYTICS: usize = 512;
}

/// Box score fetching
pub mod box_score {
    /// Timeout for each ancillary sub-document of a box score (seconds)
    pub const SUB_FETCH_TIMEOUT_SECONDS: u64 = 10;
}

/// Environment variable names
pub mod env_vars {
    /// Override for the SQLite database path
    pub const DB_PATH: &str = "SPORTS_RATINGS_DB_PATH";

    /// Override for the log file path
    pub const LOG_FILE: &str = "SPORTS_RATINGS_LOG_FILE";

    /// Override for the HTTP timeout in seconds
    pub const HTTP_TIMEOUT: &str = "SPORTS_RATINGS_HTTP_TIMEOUT";

    /// Override for the scoreboard endpoint
    pub const SCOREBOARD_URL: &str = "SPORTS_RATINGS_SCOREBOARD_URL";
}

/// Job queue retry configuration
pub mod retry {
    /// Default number of worker tasks
    pub const WORKERS: usize = 4;

    /// Maximum number of retry attempts for a failed job
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Base delay for exponential backoff (milliseconds)
    pub const BASE_DELAY_MS: u64 = 1000;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECONDS: u64 = 60;
}

/// Win probability and spread calibration defaults
pub mod prediction {
    /// Logistic scale for Elo-class ratings
    pub const ELO_SCALE: f64 = 400.0;

    /// Logistic scale for the composite power index
    pub const POWER_INDEX_SCALE: f64 = 10.0;

    /// Points of spread per Elo point
    pub const ELO_POINTS_PER_RATING: f64 = 1.0 / 25.0;

    /// Points of spread per power index point
    pub const POWER_INDEX_POINTS_PER_RATING: f64 = 1.0;

    pub const PROBABILITY_PRECISION: u32 = 4;
    pub const SPREAD_PRECISION: u32 = 1;
}

/// Analytics engine defaults
pub mod analytics {
    pub const DEFAULT_WINDOW: usize = 5;
    pub const MOVING_AVERAGE_WINDOWS: [usize; 2] = [3, 5];
    pub const DEFAULT_PRECISION: u32 = 1;
    pub const TRACKED_METRICS: [&str; 4] = ["total_yards", "rushing_yards", "passing_yards", "points"];

    /// Trend thresholds: slope as percent of the window mean, per game
    pub const TREND_STRONG_PCT: f64 = 5.0;
    pub const TREND_MODERATE_PCT: f64 = 2.0;
    pub const TREND_SLIGHT_PCT: f64 = 0.5;

    /// Momentum thresholds: percent change between recent and oldest pairs
    pub const MOMENTUM_STRONG_PCT: f64 = 10.0;
    pub const MOMENTUM_MILD_PCT: f64 = 3.0;

    /// Coefficient of variation bands (percent)
    pub const CV_VERY_CONSISTENT: f64 = 5.0;
    pub const CV_CONSISTENT: f64 = 10.0;
    pub const CV_MODERATE: f64 = 20.0;
}

/// Validation limits applied to scraped values
pub mod validation {
    /// Maximum plausible score for a single team
    pub const MAX_TEAM_SCORE: i64 = 250;

    /// Maximum length for team names
    pub const MAX_TEAM_NAME_LENGTH: usize = 80;

    /// Maximum decimal places for rounded outputs; beyond this `f64` rounding overflows
    pub const MAX_DECIMAL_PLACES: u32 = 12;
}

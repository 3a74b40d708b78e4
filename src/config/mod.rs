use crate::constants::env_vars;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod seasons;
pub mod sections;
pub mod validation;

pub use seasons::{SeasonConfig, WeekRange, season_for_date, week_for_date};
pub use sections::{
    AnalyticsConfig, ConsistencyThresholds, DatabaseConfig, HttpConfig, JobsConfig,
    MomentumThresholds, PredictionConfig, RatingDimension, RatingsConfig, RatingsTableConfig,
    ScheduleTableConfig, SourcesConfig, TrendThresholds,
};

use paths::{get_config_path, get_default_db_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Built once at startup and passed by reference into the components.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub database: DatabaseConfig,
    pub ratings: RatingsConfig,
    pub prediction: PredictionConfig,
    pub analytics: AnalyticsConfig,
    pub jobs: JobsConfig,
    pub seasons: Vec<SeasonConfig>,
}

impl Config {
    /// Loads configuration from `path`, or from the default config file location.
    /// A missing file yields the built-in defaults.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `SPORTS_RATINGS_DB_PATH` - Override the SQLite database path
    /// - `SPORTS_RATINGS_LOG_FILE` - Override log file path
    /// - `SPORTS_RATINGS_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    /// - `SPORTS_RATINGS_SCOREBOARD_URL` - Override the scoreboard endpoint
    pub async fn load(path: Option<&str>) -> Result<Self, AppError> {
        let config_path = path.map(str::to_string).unwrap_or_else(get_config_path);

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            tracing::debug!("No config file at {config_path}, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(db_path) = std::env::var(env_vars::DB_PATH) {
            self.database.path = Some(db_path);
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http.timeout_seconds = timeout;
        }

        if let Ok(url) = std::env::var(env_vars::SCOREBOARD_URL) {
            self.sources.scoreboard_url = url;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Effective SQLite path: configured value or the platform default
    pub fn db_path(&self) -> String {
        self.database
            .path
            .clone()
            .unwrap_or_else(get_default_db_path)
    }

    /// Renders the effective configuration as TOML for display.
    pub fn display(&self) -> Result<String, AppError> {
        let mut out = String::new();
        out.push_str("# Config Location: ");
        out.push_str(&get_config_path());
        out.push('\n');
        out.push_str("# Database: ");
        out.push_str(&self.db_path());
        out.push('\n');
        out.push_str("# Log Directory: ");
        out.push_str(
            self.log_file_path
                .as_deref()
                .unwrap_or(&get_log_dir_path()),
        );
        out.push_str("\n\n");
        out.push_str(&toml::to_string_pretty(self)?);
        Ok(out)
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

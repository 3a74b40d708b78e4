use crate::config::Config;
use crate::constants::validation::MAX_DECIMAL_PLACES;
use crate::error::AppError;
use std::path::Path;

fn validate_precision(field: &str, places: u32) -> Result<(), AppError> {
    if places > MAX_DECIMAL_PLACES {
        return Err(AppError::config_error(format!(
            "{field} must be at most {MAX_DECIMAL_PLACES} decimal places (got {places})"
        )));
    }
    Ok(())
}

fn validate_url(field: &str, url: &str) -> Result<(), AppError> {
    // Empty means the source is not configured
    if url.is_empty() {
        return Ok(());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::config_error(format!(
            "{field} must start with http:// or https:// (got '{url}')"
        )));
    }
    Ok(())
}

/// Validates the configuration settings
///
/// # Validation Rules
/// - Source URLs, when set, must be absolute http(s) URLs
/// - HTTP timeouts must be positive
/// - Logistic scales must be positive and finite
/// - Trend, momentum and consistency thresholds must be strictly ordered
/// - Moving average windows and the default window must be positive
/// - Rounding precisions must not exceed `MAX_DECIMAL_PLACES`
/// - Season and week ranges must not end before they start
/// - If log file path is provided, it cannot be empty and its parent must be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    let sources = &config.sources;
    validate_url("sources.scoreboard_url", &sources.scoreboard_url)?;
    validate_url("sources.box_score_url", &sources.box_score_url)?;
    validate_url("sources.schedule_url", &sources.schedule_url)?;
    validate_url("sources.ratings_api_url", &sources.ratings_api_url)?;
    for (system, url) in &sources.rankings_pages {
        validate_url(&format!("sources.rankings_pages.{system}"), url)?;
    }

    if config.http.timeout_seconds == 0 || config.http.sub_fetch_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeouts must be positive"));
    }

    for dimension in [&config.prediction.dimension_a, &config.prediction.dimension_b] {
        if !(dimension.scale.is_finite() && dimension.scale > 0.0) {
            return Err(AppError::config_error(format!(
                "Logistic scale for {} must be positive",
                dimension.system
            )));
        }
    }
    if config.prediction.dimension_a.system == config.prediction.dimension_b.system {
        return Err(AppError::config_error(
            "Prediction dimensions must use two different rating systems",
        ));
    }

    validate_precision(
        "prediction.probability_precision",
        config.prediction.probability_precision,
    )?;
    validate_precision("prediction.spread_precision", config.prediction.spread_precision)?;

    let analytics = &config.analytics;
    validate_precision("analytics.default_precision", analytics.default_precision)?;
    for (metric, places) in &analytics.precision {
        validate_precision(&format!("analytics.precision.{metric}"), *places)?;
    }
    if analytics.default_window == 0 {
        return Err(AppError::config_error("analytics.default_window must be positive"));
    }
    if analytics.moving_average_windows.is_empty()
        || analytics.moving_average_windows.contains(&0)
    {
        return Err(AppError::config_error(
            "analytics.moving_average_windows must contain positive window lengths",
        ));
    }
    let trend = &analytics.trend;
    if !(trend.strong > trend.moderate && trend.moderate > trend.slight && trend.slight >= 0.0) {
        return Err(AppError::config_error(
            "Trend thresholds must satisfy strong > moderate > slight >= 0",
        ));
    }
    let momentum = &analytics.momentum;
    if !(momentum.strong > momentum.mild && momentum.mild >= 0.0) {
        return Err(AppError::config_error(
            "Momentum thresholds must satisfy strong > mild >= 0",
        ));
    }
    let consistency = &analytics.consistency;
    if !(consistency.very_consistent < consistency.consistent
        && consistency.consistent < consistency.moderate)
    {
        return Err(AppError::config_error(
            "Consistency thresholds must satisfy very_consistent < consistent < moderate",
        ));
    }

    for season in &config.seasons {
        if season.end < season.start {
            return Err(AppError::config_error(format!(
                "Season {} ends before it starts",
                season.year
            )));
        }
        if let Some(week) = season.weeks.iter().find(|w| w.end < w.start) {
            return Err(AppError::config_error(format!(
                "Week {} of season {} ends before it starts",
                week.week, season.year
            )));
        }
    }

    if config.jobs.workers == 0 {
        return Err(AppError::config_error("jobs.workers must be positive"));
    }

    if let Some(log_path) = &config.log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

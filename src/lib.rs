//! Sports data ingestion and predictive rating engine.
//!
//! Pipeline: provider feeds are fetched ([`data_fetcher`]), team names are
//! reconciled against the registry ([`resolver`]) and upserted ([`ingest`],
//! [`store`]). On top of the stored rows the [`ratings`] aggregator blends
//! independent rating systems, [`prediction`] turns them into a win
//! probability and spread, and [`analytics`] computes rolling team trends.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sports_ratings::config::Config;
//! use sports_ratings::error::AppError;
//! use sports_ratings::prediction::PredictionService;
//! use sports_ratings::ratings::{RatingAggregator, StoreRatingSource};
//! use sports_ratings::store::{GameId, SqliteStore, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load(None).await?;
//!     let store: Arc<dyn Store> = Arc::new(SqliteStore::open(config.db_path())?);
//!
//!     let aggregator = Arc::new(RatingAggregator::new(
//!         Arc::new(StoreRatingSource::new(store.clone())),
//!         &config.ratings,
//!     ));
//!     let predictions = PredictionService::new(store, aggregator, config.prediction.clone());
//!
//!     let outcome = predictions.generate(GameId(1)).await?;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod ingest;
pub mod jobs;
pub mod logging;
pub mod prediction;
pub mod ratings;
pub mod resolver;
pub mod store;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use analytics::{AnalyticsEngine, TeamAnalytics};
pub use config::Config;
pub use error::AppError;
pub use ingest::{IngestReport, Ingestor};
pub use prediction::{PredictionOutcome, PredictionService, predict};
pub use ratings::{RatingAggregator, RatingsBundle};
pub use resolver::{EntityResolver, Resolution};
pub use store::{SqliteStore, Store};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

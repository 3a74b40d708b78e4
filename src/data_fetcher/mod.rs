pub mod api;
pub mod cache;
pub mod fetchers;
pub mod models;

pub use cache::TtlCache;
pub use fetchers::SourceFetcher;

//! Injected TTL caches used by the ratings aggregator and analytics engine.

pub mod core;
pub mod types;

pub use core::TtlCache;
pub use types::CachedEntry;

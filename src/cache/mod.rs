//! Cache Module
//!
//! Read-through caching for record stores: a bounded TTL table (`CacheStore`)
//! and the `RecordStore` decorator that consults it (`CachedStore`).

mod cached;
mod entry;
pub mod keys;
mod stats;
mod store;


// Re-export public types
pub use cached::CachedStore;
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default lifetime of a cached query result, in seconds
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default maximum number of cached query results
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

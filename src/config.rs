//! Configuration Module
//!
//! Handles loading server, persistence, cache and resilience settings from
//! environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
use crate::resilience::ResiliencePolicy;
use crate::store::PersistenceConfig;

/// Read-through cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Lifetime of a cached query result
    pub ttl: Duration,
    /// Maximum number of cached query results
    pub max_entries: usize,
    /// Also drop listing entries when a record is saved
    pub invalidate_listings: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
            invalidate_listings: false,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults,
/// except the persistence provider, which has none.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    pub persistence: PersistenceConfig,
    pub cache: CacheConfig,
    pub resilience: ResiliencePolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PERSISTENCE_PROVIDER` - `sqlite`, `document` or `memory` (no default)
    /// - `SQLITE_PATH` - SQLite database file
    /// - `DOCUMENT_DIR` - Directory holding document collections
    /// - `DOCUMENT_COLLECTION` - Collection name (default: records)
    /// - `CACHE_TTL` - Cache TTL in seconds (default: 300)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CACHE_INVALIDATE_LISTINGS` - Drop listing entries on save (default: false)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `RESILIENCE_TIMEOUT_MS` - Per-attempt timeout (default: 2000)
    /// - `RESILIENCE_MAX_ATTEMPTS` - Attempts per call (default: 3)
    /// - `RESILIENCE_BACKOFF_MS` - Linear backoff step (default: 200)
    /// - `RESILIENCE_FAILURE_THRESHOLD` - Failures before the circuit opens (default: 2)
    /// - `RESILIENCE_BREAK_SECS` - Open-circuit duration (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = PersistenceConfig::default();
        let policy = ResiliencePolicy::default();

        Self {
            server_port: parsed("SERVER_PORT").unwrap_or(3000),
            cleanup_interval: parsed("CLEANUP_INTERVAL").unwrap_or(1),
            persistence: PersistenceConfig {
                provider: text("PERSISTENCE_PROVIDER"),
                sqlite_path: text("SQLITE_PATH"),
                document_dir: text("DOCUMENT_DIR").map(PathBuf::from),
                document_collection: text("DOCUMENT_COLLECTION")
                    .unwrap_or(defaults.document_collection),
            },
            cache: CacheConfig {
                ttl: parsed("CACHE_TTL")
                    .map(Duration::from_secs)
                    .unwrap_or(Duration::from_secs(DEFAULT_TTL_SECS)),
                max_entries: parsed("CACHE_MAX_ENTRIES").unwrap_or(DEFAULT_MAX_ENTRIES),
                invalidate_listings: parsed("CACHE_INVALIDATE_LISTINGS").unwrap_or(false),
            },
            resilience: ResiliencePolicy {
                attempt_timeout: parsed("RESILIENCE_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(policy.attempt_timeout),
                max_attempts: parsed("RESILIENCE_MAX_ATTEMPTS").unwrap_or(policy.max_attempts),
                backoff_step: parsed("RESILIENCE_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(policy.backoff_step),
                failure_threshold: parsed("RESILIENCE_FAILURE_THRESHOLD")
                    .unwrap_or(policy.failure_threshold),
                break_duration: parsed("RESILIENCE_BREAK_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(policy.break_duration),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 1,
            persistence: PersistenceConfig::default(),
            cache: CacheConfig::default(),
            resilience: ResiliencePolicy::default(),
        }
    }
}

fn text(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

//! Cache Entry Module
//!
//! Defines a single cached payload with an absolute expiry.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A serialized query result and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// JSON-serialized record or record list
    pub value: String,
    /// When the entry was written
    pub created_at: Instant,
    /// Absolute expiry; fixed at write time
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(value: String, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiry.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

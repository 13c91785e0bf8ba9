//! TTL cache primitives for KeywordForge.
//!
//! The pipeline leans on the cache for two things: the per-batch
//! processing lock (atomic set-if-absent with TTL) and the per-user rate
//! limit counter. The [`Cache`] trait keeps those consumers
//! backend-agnostic; [`InMemoryCache`] is the bundled implementation.

use std::time::Duration;

use async_trait::async_trait;

use keywordforge_shared::{BatchId, Result};

mod memory;
mod rate_limit;

pub use memory::InMemoryCache;
pub use rate_limit::RateLimiter;

/// Async TTL key-value cache.
///
/// Values are strings; callers serialize structured data themselves. All
/// operations are fallible so a networked backend can surface its errors.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Get a value, or `None` when missing or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value with a TTL, overwriting any existing entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete a key. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Whether a live (non-expired) entry exists for the key.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Add `amount` to an integer value, creating it at zero if missing.
    /// A missing key gains no TTL; an existing entry keeps its TTL.
    async fn increment(&self, key: &str, amount: i64) -> Result<i64>;

    /// Atomically set a value with a TTL only when the key has no live
    /// entry. Returns `true` when the value was set. An existing entry's
    /// TTL is left untouched.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Key schema
// ---------------------------------------------------------------------------

/// Key for a batch's processing lock.
pub fn lock_key(batch_id: BatchId) -> String {
    format!("lock:{batch_id}")
}

/// Key for a user's rate limit counter.
pub fn rate_limit_key(user_id: &str) -> String {
    format!("rate_limit:{user_id}")
}

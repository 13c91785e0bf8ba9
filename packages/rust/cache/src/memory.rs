//! In-memory TTL cache backed by a concurrent map.
//!
//! Expiry is lazy: entries are purged when touched, not on a timer. Time
//! comes from `tokio::time`, so tests can pause and advance the clock.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use keywordforge_shared::{PipelineError, Result};

use crate::Cache;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn with_ttl(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Process-local [`Cache`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the entry if it has expired, so follow-up reads see a miss.
    fn purge_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| entry.is_expired());
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.purge_expired(key);
        Ok(self.entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), CacheEntry::with_ttl(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.purge_expired(key);
        Ok(self.entries.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.purge_expired(key);
        Ok(self.entries.contains_key(key))
    }

    async fn increment(&self, key: &str, amount: i64) -> Result<i64> {
        self.purge_expired(key);
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry {
                value: "0".to_string(),
                expires_at: None,
            });
        let current: i64 = entry.value.parse().map_err(|_| {
            PipelineError::cache(format!("value at {key} is not an integer"))
        })?;
        let next = current + amount;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        self.purge_expired(key);
        match self.entries.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(CacheEntry::with_ttl(value, ttl));
                Ok(true)
            }
        }
    }
}

//! Per-user request rate limiting over a cache-backed counter.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use keywordforge_shared::{PipelineError, Result};

use crate::{rate_limit_key, Cache};

/// Windowed request counter, one window per user.
///
/// The first request in a window creates the counter with the window's
/// TTL; later requests increment it without touching the TTL, so the
/// window expires as a whole and the next request starts a fresh one.
pub struct RateLimiter {
    cache: Arc<dyn Cache>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn Cache>, max_requests: u64, window: Duration) -> Self {
        Self {
            cache,
            max_requests,
            window,
        }
    }

    /// Record one request for `user_id`.
    ///
    /// Returns `Ok(())` while the user is within budget and
    /// [`PipelineError::RateLimited`] once the window is exhausted.
    /// Rejected requests do not consume budget.
    pub async fn check(&self, user_id: &str) -> Result<()> {
        let key = rate_limit_key(user_id);

        let Some(raw) = self.cache.get(&key).await? else {
            self.cache.set(&key, "1", self.window).await?;
            return Ok(());
        };

        let count: u64 = raw
            .parse()
            .map_err(|_| PipelineError::cache(format!("rate limit counter at {key} corrupt")))?;
        if count >= self.max_requests {
            debug!(user_id, count, "rate limit exceeded");
            return Err(PipelineError::RateLimited {
                retry_after_secs: self.window.as_secs(),
            });
        }

        self.cache.increment(&key, 1).await?;
        Ok(())
    }
}

//! GitHub API rate limiting.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Core API quota of one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Time to wait before the next call at unix time `now`, capped at one
    /// hour. `None` if enough requests remain or the window already reset.
    pub fn wait_duration(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }

        let wait_secs = self.reset - now;
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }

        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}

/// Waits for the core quota of `octocrab`'s token if it is nearly exhausted.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub(crate) async fn ensure_core_capacity(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;
    let info = RateLimitInfo {
        remaining: core.remaining as u32,
        reset: core.reset,
        limit: core.limit as u32,
    };

    let now = jiff::Timestamp::now().as_second().max(0) as u64;
    if let Some(wait) = info.wait_duration(now) {
        info!(
            remaining = info.remaining,
            wait_secs = wait.as_secs(),
            "Rate limit low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(remaining: u32, reset: u64) -> RateLimitInfo {
        RateLimitInfo {
            remaining,
            reset,
            limit: 5000,
        }
    }

    #[test]
    fn no_wait_with_remaining_quota() {
        assert_eq!(info(100, 2_000).wait_duration(1_000), None);
    }

    #[test]
    fn no_wait_after_reset() {
        assert_eq!(info(0, 1_000).wait_duration(1_000), None);
    }

    #[test]
    fn waits_until_reset() {
        assert_eq!(
            info(1, 1_060).wait_duration(1_000),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn caps_wait_at_one_hour() {
        assert_eq!(
            info(0, 100_000).wait_duration(0),
            Some(Duration::from_secs(MAX_WAIT_SECS))
        );
    }
}

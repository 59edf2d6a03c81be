//! Minimum spacing between successive AI calls.
//!
//! Hosted inference tiers throttle aggressively, so every AI call in the
//! ask pipeline goes through a shared [`RateLimiter`] first.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default spacing between AI calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(3);

/// Enforces a minimum interval between calls across all holders.
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the minimum interval since the previous call has passed,
    /// then claim the current slot. Concurrent callers are serialized.
    pub async fn wait_ready(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                debug!("Rate limit: waiting {:?} before next AI call", ready_at - now);
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let limiter = RateLimiter::new(Duration::from_secs(3));
        let start = Instant::now();
        limiter.wait_ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let limiter = RateLimiter::new(Duration::from_secs(3));
        let start = Instant::now();
        limiter.wait_ready().await;
        limiter.wait_ready().await;
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_spaced_call_does_not_wait() {
        let limiter = RateLimiter::new(Duration::from_secs(3));
        limiter.wait_ready().await;
        tokio::time::advance(Duration::from_secs(4)).await;

        let start = Instant::now();
        limiter.wait_ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.wait_ready().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

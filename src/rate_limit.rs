//! Client-wide request throttling.
//!
//! A token bucket built on `governor`. One limiter belongs to one
//! [`Etf2lClient`](crate::Etf2lClient) and its clones; every outbound
//! request takes a token first.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use tokio_util::sync::CancellationToken;

use crate::error::{Etf2lError, Result};

/// Requests allowed per window by the upstream API.
const DEFAULT_BURST: u32 = 60;

/// Length of the upstream quota window.
const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket capacity: how many requests may go out back to back.
    pub burst: u32,
    /// Steady-state rate: one token is added every `replenish_every`.
    pub replenish_every: Duration,
}

impl Default for RateLimitConfig {
    /// 60 requests per 10 second window.
    fn default() -> Self {
        Self {
            burst: DEFAULT_BURST,
            replenish_every: DEFAULT_WINDOW / DEFAULT_BURST,
        }
    }
}

impl RateLimitConfig {
    /// Create a config from a burst size and per-token refill period.
    pub fn new(burst: u32, replenish_every: Duration) -> Self {
        Self {
            burst,
            replenish_every,
        }
    }

    /// Allow `requests` requests per `window`, all of them usable as a burst.
    pub fn per_window(requests: u32, window: Duration) -> Self {
        Self {
            burst: requests,
            replenish_every: window / requests.max(1),
        }
    }

    fn quota(&self) -> Result<Quota> {
        let burst = NonZeroU32::new(self.burst).ok_or_else(|| {
            Etf2lError::InvalidConfig("rate limit burst must be greater than zero".to_string())
        })?;
        let quota = Quota::with_period(self.replenish_every).ok_or_else(|| {
            Etf2lError::InvalidConfig(
                "rate limit replenish period must be greater than zero".to_string(),
            )
        })?;
        Ok(quota.allow_burst(burst))
    }
}

/// Shared token bucket.
///
/// Cheap to clone; clones draw from the same bucket.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Build a limiter, rejecting a zero burst or a zero refill period.
    pub fn new(config: &RateLimitConfig) -> Result<Self> {
        let quota = config.quota()?;
        Ok(Self {
            limiter: Arc::new(Governor::direct(quota)),
            config: *config,
        })
    }

    /// The parameters this limiter was built with.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait for a token.
    ///
    /// Fails with [`Etf2lError::Cancelled`] if `cancel` fires first, in
    /// which case no token is taken.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Etf2lError::Cancelled),
            _ = self.limiter.until_ready() => Ok(()),
        }
    }

    /// Take a token if one is available right now.
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("burst", &self.config.burst)
            .field("replenish_every", &self.config.replenish_every)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio_test::{assert_err, assert_ok, block_on};

    #[test]
    fn test_default_config_matches_upstream_quota() {
        let config = RateLimitConfig::default();
        assert_eq!(config.burst, 60);
        assert_eq!(config.replenish_every * 60, Duration::from_secs(10));
    }

    #[test]
    fn test_per_window() {
        let config = RateLimitConfig::per_window(4, Duration::from_secs(1));
        assert_eq!(config.burst, 4);
        assert_eq!(config.replenish_every, Duration::from_millis(250));
    }

    #[test]
    fn test_zero_burst_rejected() {
        let err = assert_err!(RateLimiter::new(&RateLimitConfig::new(
            0,
            Duration::from_secs(1)
        )));
        assert!(matches!(err, Etf2lError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_period_rejected() {
        let err = assert_err!(RateLimiter::new(&RateLimitConfig::new(5, Duration::ZERO)));
        assert!(matches!(err, Etf2lError::InvalidConfig(_)));
    }

    #[test]
    fn test_default_limiter_serves_first_request() {
        let limiter = assert_ok!(RateLimiter::new(&RateLimitConfig::default()));
        assert_eq!(limiter.config(), &RateLimitConfig::default());

        assert_ok!(block_on(limiter.acquire(&CancellationToken::new())));
    }

    #[tokio::test]
    async fn test_burst_is_immediate() {
        let limiter = RateLimiter::new(&RateLimitConfig::new(5, Duration::from_secs(60))).unwrap();
        let cancel = CancellationToken::new();

        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire(&cancel).await.unwrap();
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!limiter.check());
    }

    #[tokio::test]
    async fn test_excess_requests_are_delayed_not_dropped() {
        let limiter =
            RateLimiter::new(&RateLimitConfig::new(2, Duration::from_millis(50))).unwrap();
        let cancel = CancellationToken::new();

        let started = Instant::now();
        for _ in 0..5 {
            limiter.acquire(&cancel).await.unwrap();
        }
        // Two from the burst, three more at 50ms intervals.
        assert!(started.elapsed() >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_acquire_cancelled_while_waiting() {
        let limiter =
            RateLimiter::new(&RateLimitConfig::new(1, Duration::from_secs(30))).unwrap();
        let cancel = CancellationToken::new();
        limiter.acquire(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let result = limiter.acquire(&cancel).await;
        assert!(matches!(result, Err(Etf2lError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_acquire_with_cancelled_token_takes_no_token() {
        let limiter =
            RateLimiter::new(&RateLimitConfig::new(1, Duration::from_secs(30))).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = limiter.acquire(&cancel).await;
        assert!(matches!(result, Err(Etf2lError::Cancelled)));
        assert!(limiter.check());
    }
}

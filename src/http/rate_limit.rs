//! Rate limiting implementation
//!
//! Uses the governor crate for token bucket rate limiting. The limiter only
//! delays requests; it never retries one.

use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per minute
    pub requests_per_minute: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::article_search()
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_minute: u32, burst_size: u32) -> Self {
        Self {
            requests_per_minute,
            burst_size,
        }
    }

    /// Spread `requests_per_minute` evenly, without bursts
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(requests_per_minute, 1)
    }

    /// Published Article Search quota (5 requests per minute)
    pub fn article_search() -> Self {
        Self::per_minute(5)
    }
}

/// Paces outgoing page requests with a token bucket
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    ///
    /// A zero rate or burst is treated as one.
    pub fn new(config: &RateLimiterConfig) -> Self {
        let rate = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN);

        Self {
            limiter: Arc::new(Governor::direct(Quota::per_minute(rate).allow_burst(burst))),
            config: config.clone(),
        }
    }

    /// The quota this limiter enforces
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Wait until the next request may go out
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("requests_per_minute", &self.config.requests_per_minute)
            .field("burst_size", &self.config.burst_size)
            .finish()
    }
}

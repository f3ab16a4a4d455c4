//! HTTP module
//!
//! Fetches result pages from the Article Search API.
//!
//! # Features
//!
//! - **Status Classification**: 401 and 429 become dedicated errors, other
//!   failures surface as unexpected responses
//! - **No Retries**: every failure propagates to the caller as-is
//! - **Optional Pacing**: token bucket rate limiter using governor, off by default

mod client;
mod rate_limit;

pub use client::{ArticleSearchClient, HttpClientConfig, PageFetcher, ARTICLE_SEARCH_URL};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

//! Article Search page fetcher
//!
//! One GET per page, with the query parameters as the query string.
//! Responses are classified rather than retried:
//! - 401 fails with an authentication error
//! - 429 fails with a rate-limit error
//! - any other non-success status, or a body that is not JSON, fails as
//!   an unexpected response

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::config::QueryParameters;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fixed Article Search endpoint
pub const ARTICLE_SEARCH_URL: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Source of result pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page described by `params` and return its parsed body
    async fn fetch(&self, params: &QueryParameters) -> Result<JsonValue>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(&self, params: &QueryParameters) -> Result<JsonValue> {
        (**self).fetch(params).await
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Search endpoint
    pub endpoint: String,
    /// Request timeout (none by default)
    pub timeout: Option<Duration>,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            endpoint: ARTICLE_SEARCH_URL.to_string(),
            timeout: None,
            rate_limit: None,
            user_agent: format!("nyt-loader/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Override the search endpoint
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client for the Article Search endpoint
pub struct ArticleSearchClient {
    client: Client,
    endpoint: Url,
    rate_limiter: Option<RateLimiter>,
}

impl ArticleSearchClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)?;

        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint,
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    async fn classify(response: Response) -> Result<JsonValue> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::authentication(
                "Make sure the api-key is set and valid",
            ));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after_seconds: extract_retry_after(&response),
            });
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::unexpected_response(
                Some(status.as_u16()),
                truncate(&body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            Error::unexpected_response(None, format!("Response body is not valid JSON: {e}"))
        })
    }
}

#[async_trait]
impl PageFetcher for ArticleSearchClient {
    async fn fetch(&self, params: &QueryParameters) -> Result<JsonValue> {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        debug!("Requesting page {} from {}", params.page(), self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&params.to_query_pairs())
            .send()
            .await?;

        Self::classify(response).await
    }
}

impl std::fmt::Debug for ArticleSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleSearchClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

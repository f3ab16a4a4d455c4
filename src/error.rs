//! Error types for nyt-loader
//!
//! This module defines the error hierarchy for the whole loader.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for nyt-loader
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error("Unauthorized request (HTTP 401): {message}")]
    Authentication { message: String },

    #[error("Too many requests (HTTP 429), per minute or per day rate limit reached{}", retry_hint(.retry_after_seconds))]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Unexpected response{}: {message}", status_hint(.status))]
    UnexpectedResponse { status: Option<u16>, message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

fn retry_hint(retry_after_seconds: &Option<u64>) -> String {
    retry_after_seconds
        .map(|secs| format!(", retry after {secs}s"))
        .unwrap_or_default()
}

fn status_hint(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an unexpected response error
    pub fn unexpected_response(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error was raised while validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
        )
    }

    /// HTTP status that caused this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { .. } => Some(401),
            Error::RateLimited { .. } => Some(429),
            Error::UnexpectedResponse { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for nyt-loader
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("api-key");
        assert_eq!(err.to_string(), "Missing required config field: api-key");

        let err = Error::unexpected_response(Some(500), "boom");
        assert_eq!(err.to_string(), "Unexpected response (HTTP 500): boom");

        let err = Error::unexpected_response(None, "not json");
        assert_eq!(err.to_string(), "Unexpected response: not json");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = Error::RateLimited {
            retry_after_seconds: Some(30),
        };
        assert!(err.to_string().ends_with("retry after 30s"));

        let err = Error::RateLimited {
            retry_after_seconds: None,
        };
        assert!(err.to_string().ends_with("rate limit reached"));
    }

    #[test]
    fn test_is_config_error() {
        assert!(Error::config("x").is_config_error());
        assert!(Error::missing_field("api-key").is_config_error());
        assert!(Error::invalid_value("sort", "bad").is_config_error());

        assert!(!Error::authentication("x").is_config_error());
        assert!(!Error::RateLimited {
            retry_after_seconds: None
        }
        .is_config_error());
        assert!(!Error::unexpected_response(None, "x").is_config_error());
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::authentication("x").status(), Some(401));
        assert_eq!(
            Error::RateLimited {
                retry_after_seconds: None
            }
            .status(),
            Some(429)
        );
        assert_eq!(Error::unexpected_response(Some(503), "x").status(), Some(503));
        assert_eq!(Error::config("x").status(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let wrapped = result.context("outer");
        assert!(wrapped
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for hostjar
//!
//! Every failure a request can hit before, during or after dispatch maps to one
//! variant here. Application-level error responses (4xx/5xx) are *not* errors:
//! they are returned normally and announced on the session's error events.

use thiserror::Error;

/// Result type alias for hostjar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hostjar
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied arguments that can never produce a valid request
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure (DNS, connection refused, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Per-call deadline elapsed
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// Response status signalled failure (only from `raise_for_status`)
    #[error("HTTP status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Storage backend could not be read or written
    #[error("Storage error for '{key}': {reason}")]
    Storage { key: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a storage error
    pub fn storage(key: impl Into<String>, reason: impl ToString) -> Self {
        Error::Storage {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Check if this is a transport error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage { .. })
    }

    /// Check if the caller passed invalid arguments
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::Url(_))
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::HttpStatus { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            match err {
                Error::Timeout {
                    operation,
                    duration_ms,
                    ..
                } => Error::Timeout {
                    operation,
                    duration_ms,
                    url: Some(url.to_string()),
                },
                other => other,
            }
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error() {
        let err = Error::timeout_with_url("request", 10_000, "https://example.com");

        assert!(err.is_timeout());
        assert!(!err.is_network());
        assert_eq!(err.url(), Some("https://example.com"));
    }

    #[test]
    fn test_with_url_fills_timeout() {
        let res: Result<()> = Err(Error::timeout("request", 250));
        let err = res.with_url("https://example.com/slow").unwrap_err();

        assert_eq!(err.url(), Some("https://example.com/slow"));
    }

    #[test]
    fn test_storage_is_distinct() {
        let err = Error::storage("cookies-abc", "disk full");

        assert!(err.is_storage());
        assert!(!err.is_invalid_argument());
        assert_eq!(err.to_string(), "Storage error for 'cookies-abc': disk full");
    }

    #[test]
    fn test_http_status() {
        let err = Error::HttpStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };

        assert_eq!(err.status_code(), Some(503));
    }
}

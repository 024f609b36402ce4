//! Error types for the binance-depth-sync crate.
//!
//! This module defines the errors that can occur while fetching snapshots,
//! streaming depth updates and keeping the local order book synchronized.
//!
//! [`Error`] is `Clone` so that the outcome of one snapshot synchronization
//! can be handed to every caller waiting on it. Transport errors that are not
//! `Clone` themselves are wrapped in an [`Arc`].

use std::sync::Arc;

/// The main error type for this crate
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// HTTP request failed (transport level)
    #[error("HTTP error: {0}")]
    Http(#[source] Arc<reqwest::Error>),

    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[source] Arc<tokio_tungstenite::tungstenite::Error>),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[source] Arc<serde_json::Error>),

    /// A caller supplied an argument outside its allowed range
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration (bad URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream REST endpoint returned a non-success status
    #[error("Upstream error ({}): {}", .0.status, .0.message)]
    Upstream(ApiError),

    /// Rate limit exceeded (HTTP 429, or 418 once banned)
    #[error("Rate limited (retry after {retry_after_ms:?} ms)")]
    RateLimited {
        /// Retry after this many milliseconds
        retry_after_ms: Option<u64>,
    },

    /// A stream frame could not be decoded as a depth update
    #[error("Malformed stream frame: {0}")]
    MalformedFrame(String),

    /// WebSocket connection closed
    #[error("WebSocket connection closed")]
    ConnectionClosed,

    /// Depth update sequence gap detected (missed messages)
    #[error("Sequence gap: expected update {expected}, got [{first}, {last}]")]
    SequenceGap {
        /// Next update id the book expected
        expected: u64,
        /// First update id of the offending event
        first: u64,
        /// Final update id of the offending event
        last: u64,
    },

    /// Too many updates queued while waiting for a snapshot
    #[error("Buffered update queue overflow ({0} updates)")]
    BufferOverflow(usize),

    /// A synchronization attempt could not produce a usable book
    #[error("Synchronization failed: {0}")]
    SyncFailure(String),

    /// No order book state exists after synchronization settled
    #[error("Order book not initialized")]
    NotInitialized,

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,
}

/// Error returned by the upstream REST API
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Error code from the API (if provided)
    pub code: Option<i64>,
    /// Error message
    pub message: String,
}

impl Error {
    /// Whether this error came from the upstream snapshot endpoint
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::Upstream(_) | Error::RateLimited { .. } | Error::Http(_) | Error::Json(_)
        )
    }

    /// Whether this error came from the diff stream
    pub fn is_stream(&self) -> bool {
        matches!(
            self,
            Error::MalformedFrame(_) | Error::WebSocket(_) | Error::ConnectionClosed | Error::Timeout
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Arc::new(err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(Arc::new(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// Create an API error with an error code
    pub fn with_code(status: u16, code: i64, message: impl Into<String>) -> Self {
        Self {
            status,
            code: Some(code),
            message: message.into(),
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display() {
        let err = Error::Upstream(ApiError::with_code(400, -1121, "Invalid symbol."));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Invalid symbol."));
        assert!(err.is_upstream());
        assert!(!err.is_stream());
    }

    #[test]
    fn test_rate_limited_display() {
        let err = Error::RateLimited {
            retry_after_ms: Some(1000),
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.is_upstream());
    }

    #[test]
    fn test_sequence_gap() {
        let err = Error::SequenceGap {
            expected: 101,
            first: 105,
            last: 110,
        };
        let text = err.to_string();
        assert!(text.contains("101"));
        assert!(text.contains("105"));
        assert!(text.contains("110"));
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err: Error = serde_json::from_str::<u64>("nope").unwrap_err().into();
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
        assert!(std::error::Error::source(&copy).is_some());
    }

    #[test]
    fn test_status_classes() {
        assert!(ApiError::new(404, "missing").is_client_error());
        assert!(ApiError::new(503, "down").is_server_error());
        assert!(!ApiError::new(503, "down").is_client_error());
    }
}

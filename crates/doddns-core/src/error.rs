//! Error types for doddns
//!
//! This module defines all error types used throughout the workspace.
//! Apart from the IP lookup fallback, every error is fatal to the engine.

use thiserror::Error;

/// Result type alias for doddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for doddns
#[derive(Error, Debug)]
pub enum Error {
    /// No IP lookup service produced a usable address
    #[error("IP lookup error: {0}")]
    IpLookup(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider response bodies that do not decode
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport errors (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one record of a type exists for the managed hostname
    #[error("found {count} {record_type} records for hostname [{hostname}], expected at most one")]
    AmbiguousRecords {
        /// Record type ("A" or "AAAA")
        record_type: String,
        /// Fully-qualified hostname
        hostname: String,
        /// Number of records returned by the provider
        count: usize,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP lookup error
    pub fn ip_lookup(msg: impl Into<String>) -> Self {
        Self::IpLookup(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an ambiguous records error
    pub fn ambiguous_records(
        record_type: impl Into<String>,
        hostname: impl Into<String>,
        count: usize,
    ) -> Self {
        Self::AmbiguousRecords {
            record_type: record_type.into(),
            hostname: hostname.into(),
            count,
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the requested domain or record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

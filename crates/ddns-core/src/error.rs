//! Error types for the DDNS bridge
//!
//! This module defines all error types used throughout the crate.
//!
//! Only [`Error::InvalidInput`] and [`Error::Authentication`] ever abort a
//! whole run. Every other variant is produced by a single provider call and
//! is folded into the outcome of the domain or family that issued it.

use thiserror::Error;

/// Result type alias for DDNS bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS bridge
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid or missing input (targets, domains, credentials)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider rejected the credential during the preflight check
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Transport-level HTTP failure (timeout, connection refused, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider answered, but not with the expected success shape
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Zone or record-set not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts a whole run instead of a single domain/family
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Authentication(_))
    }
}

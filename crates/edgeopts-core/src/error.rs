//! Error types for the options engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

use crate::validate::ValidationErrorSet;

/// Result type alias for options operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the options engine
#[derive(Error, Debug)]
pub enum Error {
    /// A required identifier was empty
    #[error("Missing required identifier: {0}")]
    MissingId(String),

    /// Malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more options failed validation against the service schema
    #[error(transparent)]
    Validation(#[from] ValidationErrorSet),

    /// A remote step failed; `context` names the step
    #[error("{context}: {source}")]
    Remote {
        /// Step that failed, e.g. "failed to get options metadata"
        context: String,
        /// Underlying transport error
        #[source]
        source: Box<Error>,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// API-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Transport name
        provider: String,
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a missing identifier error
    pub fn missing_id(what: impl Into<String>) -> Self {
        Self::MissingId(what.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a transport error with the name of the step that failed
    pub fn remote(context: impl Into<String>, source: Error) -> Self {
        Self::Remote {
            context: context.into(),
            source: Box::new(source),
        }
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

    /// Create a transport-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// The aggregated validation failures, if this is a validation error
    pub fn validation_errors(&self) -> Option<&ValidationErrorSet> {
        match self {
            Self::Validation(set) => Some(set),
            _ => None,
        }
    }

    /// Whether the error came from a remote step
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

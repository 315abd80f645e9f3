//! Error handling module
//!
//! Defines the gateway error taxonomy and handling logic

use crate::config::credentials::CredentialError;
use thiserror::Error;

/// Gateway error types
///
/// `RateLimited` is absorbed inside the gateway's retry loop and only
/// reaches callers as `RetriesExhausted`; every other variant is a
/// terminal outcome for that one request. `Configuration` is fatal for
/// the whole gateway: once credential resolution has failed, every
/// subsequent call fails the same way.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No usable client could be configured; fatal, never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Upstream rejected the request due to quota (HTTP 429)
    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// Retry budget exhausted while still rate limited
    #[error("Max retries ({attempts}) exceeded for AI request")]
    RetriesExhausted { attempts: u32 },

    /// Any other upstream rejection (auth, validation, server error);
    /// surfaced immediately, never retried
    #[error("Upstream API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request withdrawn by the caller before execution began
    #[error("Request cancelled before execution")]
    Cancelled,
}

impl GatewayError {
    /// Whether the gateway's retry loop may absorb this error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GatewayError::RateLimited)
    }

    /// Whether the condition is fatal for every subsequent call
    pub fn is_fatal(&self) -> bool {
        matches!(self, GatewayError::Configuration(_))
    }

    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "configuration_error",
            GatewayError::RateLimited => "rate_limit_error",
            GatewayError::RetriesExhausted { .. } => "retries_exhausted_error",
            GatewayError::Upstream { .. } => "api_error",
            GatewayError::Http(_) => "connection_error",
            GatewayError::Serialization(_) => "serialization_error",
            GatewayError::Cancelled => "cancelled_error",
        }
    }
}

impl From<CredentialError> for GatewayError {
    fn from(err: CredentialError) -> Self {
        GatewayError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type GatewayResult<T> = Result<T, GatewayError>;

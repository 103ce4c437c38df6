//! # Client Error Types
//!
//! Error types for API calls, configuration and cart state operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Network        │  │  Decode                 │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │                         │ │
//! │  │  ConfigLoad/Save│  │  Http {status}  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Auth        │  │   Selector      │  │      Domain             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Unauthenticated│  │  Unsupported    │  │  Core(CoreError)        │ │
//! │  │  Http 401 / 403 │  │  PartialQuantity│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use medimart_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Client error type covering every failure the storefront client can see.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Request never got a response (DNS, refused connection, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-2xx status.
    ///
    /// `detail` is the server's `detail` field when present, otherwise the
    /// raw body or the status reason.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Auth Errors
    // =========================================================================
    /// No bearer token is available for an operation that needs one.
    #[error("Not signed in")]
    Unauthenticated,

    // =========================================================================
    // Quantity Selector Errors
    // =========================================================================
    /// The selector was asked for an operation its caller did not wire up.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// A stepwise quantity change failed and could not be rolled back.
    #[error("Quantity change stopped at {reached} (wanted {target}): {reason}")]
    PartialQuantityChange {
        target: i64,
        reached: i64,
        reason: String,
    },

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Storefront rule violation from medimart-core.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Http {
                status: status.as_u16(),
                detail: err.to_string(),
            }
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if the user has to sign in (again) before retrying.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::Http { status: 401 | 403, .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if the same request may succeed when sent again.
    ///
    /// ## Retryable Errors
    /// - Network failures and timeouts
    /// - HTTP 429 and 5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout => true,
            ClientError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The server-supplied detail message, for HTTP errors.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Http { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

//! Error types surfaced by the client

use thiserror::Error;

/// Main error type for BBB On Demand operations
#[derive(Debug, Error)]
pub enum OnDemandError {
    /// Client configuration is unusable (missing identifiers, malformed URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A supplied value is not a member of the parameter's closed value set.
    ///
    /// Raised before any network call is attempted.
    #[error("Invalid {field} value: {value:?}")]
    InvalidParameter {
        /// Wire name of the offending parameter
        field: &'static str,
        /// The rejected value
        value: String,
    },

    /// The API answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code of the response
        status: u16,
        /// Response body, if one could be read
        message: String,
    },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not valid JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Request serialization or other client-side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for BBB On Demand operations
pub type Result<T> = std::result::Result<T, OnDemandError>;

/*!
 * Error types for the livestock client.
 *
 * This module contains custom error types for the different collaborators the
 * client talks to, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the server over a transport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused connection, reset...)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request did not complete within its deadline
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// The server answered with a non-success status
    #[error("Server responded with error: {status_code} - {message}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Reason phrase or body excerpt
        message: String,
    },

    /// The response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors reported by an API inside an otherwise successful response
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport level failure while calling the API
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered `success: false`
    #[error("{0}")]
    Rejected(String),
}

/// Errors in user supplied configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A URL could not be parsed
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A numeric setting is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    /// A language code is not recognised
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error from an API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Error in configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl TransportError {
    /// Whether the failure came from the deadline rather than the network
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

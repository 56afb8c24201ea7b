//! Error types for the cluster transport.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while talking to a cluster.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClientError {
    /// Raised when the connection configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the `/auth` exchange fails.
    #[error("authentication with {host} failed: {message}")]
    Auth {
        /// Host the client tried to authenticate against.
        host: String,
        /// Error message from the cluster or the HTTP stack.
        message: String,
    },
    /// Raised when the request never produced an HTTP response.
    #[error("transport error: {message}")]
    Transport {
        /// Error message from the HTTP stack.
        message: String,
    },
    /// Raised when the cluster rejects a command. The message is the
    /// cluster's own text, for example a `CMMVC` error.
    #[error("{message}")]
    Rejected {
        /// Command that was rejected.
        command: String,
        /// Message returned by the cluster.
        message: String,
    },
    /// Raised when a response body is not valid JSON.
    #[error("failed to decode {command} response: {message}")]
    Decode {
        /// Command whose response could not be decoded.
        command: String,
        /// Decoder error message.
        message: String,
    },
}

impl From<ConfigError> for ClientError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

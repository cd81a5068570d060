//! Recorder error types

use thiserror::Error;
use wirecheck_domain::DomainError;

/// Errors that abort the current test.
///
/// Every variant has already been handed to the reporter's fatal channel by the
/// time the caller sees it.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// A domain validation error occurred.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The HTTP client or its cookie store could not be created.
    #[error("failed to initialize HTTP client: {0}")]
    ClientInit(String),

    /// The ephemeral test server could not be started.
    #[error("failed to start test server: {0}")]
    Server(String),

    /// A form or JSON body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encoding(String),

    /// A multipart part could not be written.
    #[error("failed to build multipart body: {0}")]
    Multipart(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The destination refused the connection.
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused {
        /// Host that refused.
        host: String,
        /// Port that refused.
        port: u16,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport failure.
    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result type alias for recorder operations.
pub type RecorderResult<T> = Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_message_passes_through() {
        let err = RecorderError::from(DomainError::InvalidUrl("bad".to_string()));
        assert_eq!(err.to_string(), "invalid URL: bad");
    }

    #[test]
    fn test_connection_refused_message() {
        let err = RecorderError::ConnectionRefused {
            host: "127.0.0.1".to_string(),
            port: 9,
        };
        assert_eq!(err.to_string(), "connection refused: 127.0.0.1:9");
    }
}

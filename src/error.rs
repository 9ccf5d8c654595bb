//! Error types
//!
//! One flat error type shared by the client, the repositories, and the views.
//! Views never surface these directly; they call [`RecordsError::user_message`].

use thiserror::Error;

/// Errors that can occur while talking to the backend or the local store
#[derive(Error, Debug)]
pub enum RecordsError {
    /// Transport timeout (5 s by default)
    #[error("Request timeout")]
    Timeout,

    /// Backend could not be reached
    #[error("Backend unavailable")]
    Unavailable,

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Form payload rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Local store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecordsError {
    /// Whether this error means "no such record" rather than a failure
    pub fn is_not_found(&self) -> bool {
        match self {
            RecordsError::NotFound(_) => true,
            RecordsError::Api { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Whether the error came from the network path
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            RecordsError::Timeout
                | RecordsError::Unavailable
                | RecordsError::Request(_)
                | RecordsError::Api { .. }
        )
    }

    /// Text shown in an error banner
    pub fn user_message(&self) -> String {
        match self {
            RecordsError::Timeout => "The server took too long to respond".to_string(),
            RecordsError::Unavailable => "Unable to reach the server".to_string(),
            RecordsError::Api { message, .. } if !message.is_empty() => message.clone(),
            RecordsError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for records operations
pub type RecordsResult<T> = Result<T, RecordsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecordsError::NotFound("blotter 42".to_string());
        assert_eq!(err.to_string(), "Not found: blotter 42");

        let err = RecordsError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: boom");
    }

    #[test]
    fn test_classification() {
        assert!(RecordsError::NotFound("x".into()).is_not_found());
        assert!(RecordsError::Api {
            status: 404,
            message: String::new()
        }
        .is_not_found());
        assert!(!RecordsError::Timeout.is_not_found());

        assert!(RecordsError::Timeout.is_remote());
        assert!(!RecordsError::Storage("disk".into()).is_remote());
    }

    #[test]
    fn test_user_message_never_empty() {
        let errors = [
            RecordsError::Timeout,
            RecordsError::Unavailable,
            RecordsError::Api {
                status: 502,
                message: String::new(),
            },
            RecordsError::Validation("Resident name is required".into()),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RecordsError = io_err.into();
        assert!(matches!(err, RecordsError::Io(_)));
    }
}

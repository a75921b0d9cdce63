//! Error types for the Epistola API client.

use thiserror::Error;

/// Errors that can occur when querying the Epistola API.
#[derive(Debug, Error)]
pub enum EpistolaError {
    /// The API returned an error status (e.g. 401 invalid key, 500 internal).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// No generation job exists for the given request id.
    #[error("generation job not found: {0}")]
    JobNotFound(String),

    /// The request id is not a UUID; Epistola request ids always are.
    #[error("invalid request id (expected UUID): {0}")]
    InvalidRequestId(String),

    /// Underlying network failure (DNS, connection refused, timeout) or an
    /// undecodable response body. Wraps the original `reqwest` error.
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = EpistolaError::ApiError {
            status: 401,
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "API error (status 401): Invalid API key");
    }

    #[test]
    fn job_not_found_display() {
        let err = EpistolaError::JobNotFound("req-9".into());
        assert_eq!(err.to_string(), "generation job not found: req-9");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EpistolaError>();
    }
}

//! Error types for the sheets client

use thiserror::Error;

/// Sheets client error types
#[derive(Debug, Error)]
pub enum SheetsError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Token exchange failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// Service-account key could not be used
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl SheetsError {
    /// Whether retrying the same call later may succeed
    ///
    /// Connection problems, timeouts, rate limiting (429) and server-side
    /// failures (5xx) are transient; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            SheetsError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SheetsError::Api { status, .. } => *status == 429 || *status >= 500,
            SheetsError::Auth(_) => true,
            SheetsError::Credentials(_) | SheetsError::Decode(_) => false,
        }
    }
}

/// Result type for sheets operations
pub type SheetsResult<T> = Result<T, SheetsError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> SheetsError {
        SheetsError::Api {
            status,
            message: "x".to_string(),
        }
    }

    #[test]
    fn test_rate_limit_and_server_errors_are_transient() {
        assert!(api(429).is_transient());
        assert!(api(500).is_transient());
        assert!(api(503).is_transient());
    }

    #[test]
    fn test_client_errors_are_permanent() {
        assert!(!api(400).is_transient());
        assert!(!api(403).is_transient());
        assert!(!api(404).is_transient());
        assert!(!SheetsError::Decode("bad".to_string()).is_transient());
        assert!(!SheetsError::Credentials("bad".to_string()).is_transient());
    }
}

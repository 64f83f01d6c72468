use std::time::Duration;
use thiserror::Error;

/// Failure of a single request against the remote service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request rejected by service: {0}")]
    Rejected(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout)
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    /// Timeouts and connection failures, as opposed to answers from the service
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Timeout(_) | ClientError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classes() {
        assert!(ClientError::Timeout(Duration::from_secs(300)).is_transient());
        assert!(ClientError::Transport("connection refused".to_string()).is_transient());
        assert!(!ClientError::Status { status: 500, body: String::new() }.is_transient());
        assert!(!ClientError::Decode("eof".to_string()).is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ClientError::Timeout(Duration::from_secs(300)).to_string(),
            "request timed out after 300s"
        );
        assert_eq!(
            ClientError::Status { status: 401, body: "unauthorized".to_string() }.to_string(),
            "HTTP 401: unauthorized"
        );
    }
}

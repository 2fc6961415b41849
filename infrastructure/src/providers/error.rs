//! Provider errors and their retry classification.

use std::time::Duration;
use taskloop_application::ModelError;
use taskloop_domain::core::string::truncate;
use thiserror::Error;

/// Longest response body quoted in an error message.
const MAX_BODY_IN_ERROR: usize = 500;

/// Something went wrong talking to a model provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("API key not set (expected in ${env})")]
    MissingApiKey { env: String },

    #[error("Authentication failed (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Rate limited (HTTP 429): {body}")]
    RateLimited {
        retry_after: Option<Duration>,
        body: String,
    },

    #[error("Quota exceeded: {body}")]
    QuotaExceeded { body: String },

    #[error("Invalid request (HTTP {status}): {body}")]
    InvalidRequest { status: u16, body: String },

    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response.
    pub fn from_http_status(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        let body = truncate(body.trim(), MAX_BODY_IN_ERROR);
        match status {
            401 | 403 => ProviderError::Auth { status, body },
            429 if body.contains("insufficient_quota") => ProviderError::QuotaExceeded { body },
            429 => ProviderError::RateLimited { retry_after, body },
            400 | 404 | 422 => ProviderError::InvalidRequest { status, body },
            500..=599 => ProviderError::Server { status, body },
            _ => ProviderError::UnexpectedStatus { status, body },
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Server { .. }
                | ProviderError::Timeout(_)
                | ProviderError::Connection(_)
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

impl From<ProviderError> for ModelError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { retry_after, .. } => ModelError::Transient {
                message: err.to_string(),
                retry_after,
            },
            e if e.is_transient() => ModelError::transient(e.to_string()),
            e => ModelError::fatal(e.to_string()),
        }
    }
}

/// Parse a `Retry-After` header given in seconds.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let cases = [
            (401, false),
            (403, false),
            (429, true),
            (400, false),
            (404, false),
            (422, false),
            (500, true),
            (503, true),
            (418, false),
        ];
        for (status, transient) in cases {
            let err = ProviderError::from_http_status(status, None, "body");
            assert_eq!(err.is_transient(), transient, "status {}", status);
            assert_eq!(ModelError::from(err).is_transient(), transient);
        }
    }

    #[test]
    fn test_quota_is_fatal() {
        let err = ProviderError::from_http_status(
            429,
            None,
            r#"{"error":{"code":"insufficient_quota"}}"#,
        );
        assert!(matches!(err, ProviderError::QuotaExceeded { .. }));
        assert!(!ModelError::from(err).is_transient());
    }

    #[test]
    fn test_retry_after_is_carried_over() {
        let err = ProviderError::from_http_status(429, parse_retry_after("12"), "slow down");
        let model_err = ModelError::from(err);
        assert_eq!(model_err.retry_after(), Some(Duration::from_secs(12)));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("3"), Some(Duration::from_secs(3)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("NaN"), None);
    }

    #[test]
    fn test_parse_retry_after_out_of_range() {
        assert_eq!(parse_retry_after("1e30"), None);
        assert_eq!(parse_retry_after("inf"), None);
    }

    #[test]
    fn test_long_bodies_are_cut() {
        let err = ProviderError::from_http_status(500, None, &"x".repeat(5000));
        assert!(err.to_string().len() < 600);
    }
}

//! Error types for Cloud Foundry API operations.

use std::time::Duration;

use thiserror::Error;

use crate::poll::Operation;

/// Errors that can occur during Cloud Foundry API operations.
#[derive(Debug, Error)]
pub enum CfError {
    /// Configuration is missing or incomplete.
    #[error("Cloud Foundry configuration required: {0}")]
    ConfigMissing(String),

    /// Entity not found.
    #[error("{entity_type} '{guid}' not found")]
    NotFound {
        entity_type: &'static str,
        guid: String,
    },

    /// API request failed. `title`/`detail` come from the V3 error body
    /// (e.g. "CF-ResourceNotFound").
    #[error("Cloud Foundry API error: {title}: {detail}")]
    ApiError {
        title: String,
        detail: String,
        code: Option<u64>,
        status_code: Option<u16>,
    },

    /// OAuth2 token grant against UAA failed.
    #[error("token grant failed: {0}")]
    TokenGrant(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    /// A poll policy that can never make progress (zero interval, or
    /// neither `max_attempts` nor `deadline` set).
    #[error("invalid poll policy: {0}")]
    InvalidPollPolicy(String),

    /// The remote operation reached a failure terminal state. This is a
    /// successful poll, not a transport error; the final [`Operation`]
    /// (state and description) is attached.
    #[error("operation '{guid}' failed in state '{state}'{desc}",
        guid = .0.guid,
        state = .0.state,
        desc = .0.description.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    OperationFailed(Operation),

    /// Polling exhausted its attempt/deadline budget while the operation
    /// remained non-terminal.
    #[error("polling '{guid}' exhausted after {attempts} attempts ({elapsed:?}), last state: {last_state:?}")]
    PollingExhausted {
        guid: String,
        attempts: u32,
        elapsed: Duration,
        last_state: Option<String>,
    },

    /// Polling was cancelled by the caller.
    #[error("polling '{guid}' cancelled after {attempts} attempts")]
    PollingCancelled { guid: String, attempts: u32 },
}

impl CfError {
    /// Whether a fetch that failed with this error may succeed if retried.
    ///
    /// Transport-level failures and 5xx/429 responses are expected to be
    /// temporary; 4xx responses (missing resource, revoked credentials,
    /// malformed request) cannot self-resolve by waiting.
    pub fn is_retryable(&self) -> bool {
        match self {
            CfError::HttpError(_) => true,
            CfError::RateLimited { .. } => true,
            CfError::ApiError { status_code, .. } => {
                matches!(status_code, Some(code) if *code >= 500)
            }
            _ => false,
        }
    }
}

/// Result type alias for Cloud Foundry operations.
pub type Result<T> = core::result::Result<T, CfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = CfError::ApiError {
            title: "CF-ServiceUnavailable".to_string(),
            detail: "upstream blip".to_string(),
            code: Some(10015),
            status_code: Some(503),
        };
        assert!(err.is_retryable());

        assert!(CfError::RateLimited {
            retry_after_secs: Some(5)
        }
        .is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let not_found = CfError::ApiError {
            title: "CF-ResourceNotFound".to_string(),
            detail: "App not found".to_string(),
            code: Some(10010),
            status_code: Some(404),
        };
        assert!(!not_found.is_retryable());

        let unauthorized = CfError::ApiError {
            title: "CF-InvalidAuthToken".to_string(),
            detail: "Invalid Auth Token".to_string(),
            code: Some(1000),
            status_code: Some(401),
        };
        assert!(!unauthorized.is_retryable());

        assert!(!CfError::ConfigMissing("CF_API_URL".to_string()).is_retryable());
    }

    #[test]
    fn test_operation_failed_display_includes_description() {
        let err = CfError::OperationFailed(Operation {
            guid: "op-1".to_string(),
            state: "failed".to_string(),
            description: Some("quota exceeded".to_string()),
        });
        let msg = err.to_string();
        assert!(msg.contains("op-1"));
        assert!(msg.contains("failed"));
        assert!(msg.contains("quota exceeded"));
    }
}

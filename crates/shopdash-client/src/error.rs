use shopdash_core::ValidationError;
use thiserror::Error;

/// Errors returned by [`crate::DummyJsonClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response arrived but did not satisfy the entity schema.
    #[error("invalid response for {context}: {source}")]
    Validation {
        context: String,
        #[source]
        source: ValidationError,
    },

    /// The caller's cancellation token fired before the call completed.
    #[error("request cancelled")]
    Cancelled,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request could not be completed.
    Transport,
    /// A response was received but its shape is wrong.
    Validation,
    Cancelled,
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Http(_) | ApiError::Status { .. } | ApiError::InvalidBaseUrl { .. } => {
                FailureKind::Transport
            }
            ApiError::Validation { .. } => FailureKind::Validation,
            ApiError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    ///
    /// **Retriable:** network-level failures, HTTP 429 and 5xx.
    ///
    /// **Not retriable:** other statuses, schema violations (the contract
    /// mismatch will not fix itself), cancellation, bad configuration.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Http(_) => true,
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            ApiError::Validation { .. } | ApiError::Cancelled | ApiError::InvalidBaseUrl { .. } => {
                false
            }
        }
    }

    /// The schema violations, when this is a validation failure.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            ApiError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}

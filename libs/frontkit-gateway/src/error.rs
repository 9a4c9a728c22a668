use std::fmt;
use thiserror::Error;

/// Boxed error source used for causes the gateway does not model itself.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why an in-flight request was cancelled.
///
/// Cancellation is an expected control-flow outcome, not a failure: it is
/// never forwarded to the notification surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// A newer request with the same fingerprint replaced this one.
    Superseded,
    /// [`cancel_all_requests`](crate::ApiGateway::cancel_all_requests) was invoked.
    CancelAll,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superseded => f.write_str("superseded by duplicate request"),
            Self::CancelAll => f.write_str("cancel all requests"),
        }
    }
}

/// Normalized request failure produced once at the gateway boundary.
///
/// Downstream code consumes only this shape; the raw transport error is
/// preserved as a `source` where one exists.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request was cancelled before it settled.
    #[error("request cancelled: {reason}")]
    Cancelled {
        /// What triggered the cancellation.
        reason: CancelReason,
    },

    /// No response reached the client (connection refused, DNS failure,
    /// timeout before any response).
    #[error("network unavailable: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered, but with a non-success status or a response
    /// envelope flagged as failed.
    #[error("request failed with status {status}: {message}")]
    Business {
        /// HTTP status of the response that carried the failure.
        status: u16,
        /// User-facing message, either backend-supplied or status-mapped.
        message: String,
    },

    /// Anything that does not fit the other variants (malformed envelope,
    /// invalid request parts).
    #[error("unexpected request failure: {0}")]
    Unknown(#[source] BoxError),
}

impl GatewayError {
    /// True for the expected-cancellation outcome.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// HTTP status associated with a business failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Business { status, .. } => Some(*status),
            Self::Cancelled { .. } | Self::Network(_) | Self::Unknown(_) => None,
        }
    }
}

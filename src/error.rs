//! Failure taxonomy surfaced to callers, and configuration errors.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a request was aborted before it settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// A newer request of the same kind displaced this one.
    Superseded,
    /// The caller cancelled through the request handle.
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Superseded => f.write_str("superseded by a new request of the same kind"),
            AbortReason::Cancelled => f.write_str("cancelled by the caller"),
        }
    }
}

/// What a transport reports to the caller's error callback.
///
/// The gate delivers these verbatim; it never retries, reclassifies or
/// swallows them. In particular an aborted request still reaches the
/// caller's error callback, carrying the reason so callers can
/// special-case it themselves.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestFailure {
    /// The request was aborted before it settled.
    #[error("request aborted: {0}")]
    Aborted(AbortReason),

    /// The transport could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("rejected with status {status}")]
    Rejected {
        /// Status code reported by the backend.
        status: u16,
        /// Response body, when the transport captured one.
        body: Option<Value>,
    },
}

impl RequestFailure {
    /// True for tracker- or caller-initiated aborts.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, RequestFailure::Aborted(_))
    }
}

/// A string identifier that names no known mode or operation kind.
///
/// Misconfiguration fails loudly at the parsing boundary instead of
/// silently falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Not one of `force`, `prevent`, `abort`.
    #[error("unrecognized mode {0:?} (expected force, prevent or abort)")]
    UnknownMode(String),

    /// Not one of `read`, `create`, `update`, `patch`, `delete`.
    #[error("unrecognized operation kind {0:?}")]
    UnknownKind(String),
}

//! Per-call options: mode override, payload passthrough, completion
//! callbacks.

use crate::error::RequestFailure;
use crate::mode::Mode;
use crate::request::ResponseMeta;
use serde_json::Value;

/// Success callback: receives the entity, the response body and the
/// completion metadata.
pub type SuccessCallback<E> = Box<dyn FnOnce(&E, Value, &ResponseMeta) + Send>;

/// Error callback: receives the entity, the failure (verbatim from the
/// transport) and the completion metadata.
pub type ErrorCallback<E> = Box<dyn FnOnce(&E, RequestFailure, &ResponseMeta) + Send>;

/// Options for a single call through the gate.
///
/// Everything is optional: the mode falls back to the gate's default table
/// for the kind, the payload is handed to the transport untouched, and a
/// missing callback still gets the bookkeeping wrapper installed in its
/// place.
pub struct RequestOptions<E> {
    /// Per-call mode override; takes precedence over the default table.
    pub mode: Option<Mode>,
    /// Opaque payload forwarded to the transport verbatim.
    pub payload: Option<Value>,
    /// Invoked once if the request settles successfully.
    pub success: Option<SuccessCallback<E>>,
    /// Invoked once if the request fails or is aborted.
    pub error: Option<ErrorCallback<E>>,
}

impl<E> RequestOptions<E> {
    /// Empty options: default mode, no payload, no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: None,
            payload: None,
            success: None,
            error: None,
        }
    }

    /// Overrides the mode for this call only.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches an opaque payload for the transport.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attaches a success callback.
    #[must_use]
    pub fn on_success(
        mut self,
        callback: impl FnOnce(&E, Value, &ResponseMeta) + Send + 'static,
    ) -> Self {
        self.success = Some(Box::new(callback));
        self
    }

    /// Attaches an error callback.
    #[must_use]
    pub fn on_error(
        mut self,
        callback: impl FnOnce(&E, RequestFailure, &ResponseMeta) + Send + 'static,
    ) -> Self {
        self.error = Some(Box::new(callback));
        self
    }
}

impl<E> Default for RequestOptions<E> {
    fn default() -> Self {
        Self::new()
    }
}

//! In-flight request handles.

use crate::error::AbortReason;
use crate::kind::OperationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier of one dispatched request, monotonic within a gate.
///
/// Later requests always compare greater, which is the submission order
/// the prevent and abort decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cancellation hook a transport returns for one dispatched request.
///
/// `abort` asks the underlying operation to stop. It must not invoke
/// completion callbacks synchronously: an aborted request settles later
/// through the normal error path, carrying
/// [`RequestFailure::Aborted`](crate::RequestFailure::Aborted). Aborting
/// a request that already settled is a no-op.
pub trait Abortable: Send + Sync {
    /// Requests cancellation of the underlying operation.
    fn abort(&self, reason: AbortReason);
}

/// Opaque token for one in-flight request.
///
/// Clones share the same underlying request; the copy the caller keeps
/// and the copy in the tracked table compare equal by [`RequestHandle::id`].
#[derive(Clone)]
pub struct RequestHandle {
    id: RequestId,
    kind: OperationKind,
    canceller: Arc<dyn Abortable>,
}

impl RequestHandle {
    pub(crate) fn new(id: RequestId, kind: OperationKind, canceller: Arc<dyn Abortable>) -> Self {
        Self { id, kind, canceller }
    }

    /// Identifier assigned at dispatch.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// The operation kind this request was dispatched as.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Cancels the request. The entity's error callback still fires once,
    /// with [`AbortReason::Cancelled`] inside
    /// [`RequestFailure::Aborted`](crate::RequestFailure::Aborted).
    pub fn abort(&self) {
        self.canceller.abort(AbortReason::Cancelled);
    }

    pub(crate) fn abort_with(&self, reason: AbortReason) {
        self.canceller.abort(reason);
    }
}

impl fmt::Debug for RequestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RequestHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RequestHandle {}

/// Completion metadata handed to callbacks alongside the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseMeta {
    /// The request this settlement belongs to.
    pub request: RequestId,
    /// The operation kind it was dispatched as.
    pub kind: OperationKind,
}

//! Transport abstraction.
//!
//! The gate never performs I/O itself: it hands every dispatched operation
//! to a [`Transport`], the host framework's pre-existing request primitive,
//! with its own bookkeeping callbacks substituted for the caller's.

use crate::kind::OperationKind;
use crate::options::{ErrorCallback, SuccessCallback};
use crate::request::{Abortable, RequestId};
use serde_json::Value;
use std::sync::Arc;

/// One dispatched operation, carrying the gate's wrapped callbacks.
pub struct DispatchRequest<E> {
    /// Identifier assigned by the gate; echo it back in
    /// [`ResponseMeta`](crate::ResponseMeta).
    pub id: RequestId,
    /// The logical operation being performed.
    pub kind: OperationKind,
    /// The entity the operation addresses.
    pub entity: Arc<E>,
    /// Caller payload, forwarded verbatim.
    pub payload: Option<Value>,
    /// Invoke on the success path only.
    pub success: SuccessCallback<E>,
    /// Invoke on failure, including aborts.
    pub error: ErrorCallback<E>,
}

/// The host framework's request-dispatch primitive.
///
/// Contract:
/// - `dispatch` returns immediately with a cancellation hook. It must not
///   block, and it must not invoke either callback before returning.
/// - Exactly one of `success` and `error` is invoked, exactly once, when
///   the request settles.
/// - After [`Abortable::abort`], the request settles through the error
///   callback with [`RequestFailure::Aborted`](crate::RequestFailure::Aborted)
///   carrying the given reason.
pub trait Transport<E>: Send + Sync {
    /// Starts the underlying request and returns its cancellation hook.
    fn dispatch(&self, request: DispatchRequest<E>) -> Arc<dyn Abortable>;
}

/// A scripted transport for tests.
pub mod mock {
    use super::{DispatchRequest, Transport};
    use crate::error::{AbortReason, RequestFailure};
    use crate::kind::OperationKind;
    use crate::options::{ErrorCallback, SuccessCallback};
    use crate::request::{Abortable, RequestId, ResponseMeta};
    use serde_json::Value;
    use std::sync::{Arc, Mutex, MutexGuard, Weak};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        InFlight,
        AbortRequested(AbortReason),
        Settled,
    }

    struct ScriptedRequest<E> {
        id: RequestId,
        kind: OperationKind,
        entity: Arc<E>,
        payload: Option<Value>,
        success: Option<SuccessCallback<E>>,
        error: Option<ErrorCallback<E>>,
        phase: Phase,
        abort_calls: usize,
    }

    struct MockState<E> {
        requests: Vec<ScriptedRequest<E>>,
        abort_order: Vec<RequestId>,
    }

    impl<E> Default for MockState<E> {
        fn default() -> Self {
            Self {
                requests: Vec::new(),
                abort_order: Vec::new(),
            }
        }
    }

    /// Records every dispatch and settles requests on command, the way the
    /// host's real transport eventually would. Aborts are not synchronous:
    /// an abort marks the request and the settlement is delivered later by
    /// [`MockTransport::settle_aborted`] or [`MockTransport::flush_aborted`].
    ///
    /// Requests are addressed by dispatch order; `0` is the first call.
    /// Callbacks run after the internal lock is released, so a callback may
    /// dispatch follow-up requests through the same transport.
    pub struct MockTransport<E> {
        state: Arc<Mutex<MockState<E>>>,
    }

    impl<E> MockTransport<E> {
        /// Creates an empty mock.
        #[must_use]
        pub fn new() -> Self {
            Self {
                state: Arc::new(Mutex::new(MockState::default())),
            }
        }

        /// Number of requests dispatched so far.
        #[must_use]
        pub fn dispatch_count(&self) -> usize {
            self.lock().requests.len()
        }

        /// The id the gate assigned to the `index`-th dispatch.
        #[must_use]
        pub fn request_id(&self, index: usize) -> RequestId {
            self.lock().requests[index].id
        }

        /// The kind of the `index`-th dispatch.
        #[must_use]
        pub fn request_kind(&self, index: usize) -> OperationKind {
            self.lock().requests[index].kind
        }

        /// The payload attached to the `index`-th dispatch.
        #[must_use]
        pub fn request_payload(&self, index: usize) -> Option<Value> {
            self.lock().requests[index].payload.clone()
        }

        /// How many times `abort` was called on the `index`-th request,
        /// including calls that landed after it settled.
        #[must_use]
        pub fn abort_calls(&self, index: usize) -> usize {
            self.lock().requests[index].abort_calls
        }

        /// Whether the `index`-th request has an abort awaiting delivery.
        #[must_use]
        pub fn abort_requested(&self, index: usize) -> bool {
            matches!(self.lock().requests[index].phase, Phase::AbortRequested(_))
        }

        /// Ids of the requests whose abort took effect, in the order the
        /// aborts landed.
        #[must_use]
        pub fn aborted_in_order(&self) -> Vec<RequestId> {
            self.lock().abort_order.clone()
        }

        /// Settles the `index`-th request on its success path.
        ///
        /// # Panics
        /// Panics when the request already settled.
        pub fn settle_success(&self, index: usize, body: Value) {
            let (entity, callback, meta) = {
                let mut state = self.lock();
                let request = &mut state.requests[index];
                assert!(
                    request.phase != Phase::Settled,
                    "request {index} already settled"
                );
                request.phase = Phase::Settled;
                request.error = None;
                let meta = ResponseMeta {
                    request: request.id,
                    kind: request.kind,
                };
                (Arc::clone(&request.entity), request.success.take(), meta)
            };
            if let Some(callback) = callback {
                callback(entity.as_ref(), body, &meta);
            }
        }

        /// Settles the `index`-th request on its error path.
        ///
        /// # Panics
        /// Panics when the request already settled.
        pub fn settle_error(&self, index: usize, failure: RequestFailure) {
            let (entity, callback, meta) = {
                let mut state = self.lock();
                let request = &mut state.requests[index];
                assert!(
                    request.phase != Phase::Settled,
                    "request {index} already settled"
                );
                request.phase = Phase::Settled;
                request.success = None;
                let meta = ResponseMeta {
                    request: request.id,
                    kind: request.kind,
                };
                (Arc::clone(&request.entity), request.error.take(), meta)
            };
            if let Some(callback) = callback {
                callback(entity.as_ref(), failure, &meta);
            }
        }

        /// Delivers the pending abort of the `index`-th request: settles it
        /// on the error path with the recorded reason.
        ///
        /// # Panics
        /// Panics when no abort is pending for the request.
        pub fn settle_aborted(&self, index: usize) {
            let reason = {
                let state = self.lock();
                match state.requests[index].phase {
                    Phase::AbortRequested(reason) => reason,
                    other => panic!("request {index} has no abort pending (phase {other:?})"),
                }
            };
            self.settle_error(index, RequestFailure::Aborted(reason));
        }

        /// Delivers every pending abort in dispatch order. Returns how many
        /// requests were settled.
        pub fn flush_aborted(&self) -> usize {
            let pending: Vec<usize> = {
                let state = self.lock();
                state
                    .requests
                    .iter()
                    .enumerate()
                    .filter(|(_, request)| matches!(request.phase, Phase::AbortRequested(_)))
                    .map(|(index, _)| index)
                    .collect()
            };
            for &index in &pending {
                self.settle_aborted(index);
            }
            pending.len()
        }

        fn lock(&self) -> MutexGuard<'_, MockState<E>> {
            self.state.lock().unwrap()
        }
    }

    impl<E> Default for MockTransport<E> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> Clone for MockTransport<E> {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
            }
        }
    }

    impl<E: Send + Sync + 'static> Transport<E> for MockTransport<E> {
        fn dispatch(&self, request: DispatchRequest<E>) -> Arc<dyn Abortable> {
            let mut state = self.lock();
            let index = state.requests.len();
            state.requests.push(ScriptedRequest {
                id: request.id,
                kind: request.kind,
                entity: request.entity,
                payload: request.payload,
                success: Some(request.success),
                error: Some(request.error),
                phase: Phase::InFlight,
                abort_calls: 0,
            });
            Arc::new(ScriptedAbort {
                index,
                state: Arc::downgrade(&self.state),
            })
        }
    }

    struct ScriptedAbort<E> {
        index: usize,
        state: Weak<Mutex<MockState<E>>>,
    }

    impl<E: Send + Sync + 'static> Abortable for ScriptedAbort<E> {
        fn abort(&self, reason: AbortReason) {
            let Some(state) = self.state.upgrade() else {
                return;
            };
            let mut state = state.lock().unwrap();
            let request = &mut state.requests[self.index];
            request.abort_calls += 1;
            if request.phase != Phase::InFlight {
                return;
            }
            request.phase = Phase::AbortRequested(reason);
            let id = request.id;
            state.abort_order.push(id);
        }
    }
}

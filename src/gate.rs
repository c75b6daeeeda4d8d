//! The operation entry point and dispatch tracker.
//!
//! [`SyncGate`] funnels every read, create, update, patch and delete call
//! on an entity through one place: it resolves the concurrency mode, asks
//! the policy resolver for a disposition, executes it (optionally sweeping
//! in-flight requests of the same kind) and wraps the caller's completion
//! callbacks so a settled request leaves the tracked table exactly once.

use crate::entity::{EntityId, Syncable};
use crate::error::AbortReason;
use crate::kind::OperationKind;
use crate::mode::{Mode, ModeDefaults};
use crate::options::{ErrorCallback, RequestOptions, SuccessCallback};
use crate::policy::{self, Disposition};
use crate::request::{RequestHandle, RequestId};
use crate::table::RequestTable;
use crate::transport::{DispatchRequest, Transport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
};
use tracing::{debug, trace, warn};

/// Per-entity request concurrency gate.
///
/// Cheap to clone; clones share the same tracked state and configuration.
pub struct SyncGate<E> {
    inner: Arc<GateInner<E>>,
}

struct GateInner<E> {
    transport: Arc<dyn Transport<E>>,
    defaults: RwLock<ModeDefaults>,
    tables: Mutex<HashMap<EntityId, RequestTable>>,
    request_ids: AtomicU64,
}

impl<E: Syncable> SyncGate<E> {
    /// Creates a gate with the documented default modes: `read` aborts,
    /// every write kind prevents.
    pub fn new(transport: Arc<dyn Transport<E>>) -> Self {
        Self::with_defaults(transport, ModeDefaults::default())
    }

    /// Creates a gate with a custom default-mode table.
    pub fn with_defaults(transport: Arc<dyn Transport<E>>, defaults: ModeDefaults) -> Self {
        Self {
            inner: Arc::new(GateInner {
                transport,
                defaults: RwLock::new(defaults),
                tables: Mutex::new(HashMap::new()),
                request_ids: AtomicU64::new(1),
            }),
        }
    }

    // ── Operation entry point ──────────────────────────────────────────

    /// Funnels one operation through the gate.
    ///
    /// Resolves the mode (per-call override, else the default for `kind`),
    /// applies it against the entity's outstanding requests of the same
    /// kind and either dispatches through the transport or suppresses the
    /// call. Suppression returns `None`: the transport is not invoked and
    /// neither callback will ever fire. Every dispatched request returns
    /// its handle and is tracked until settlement.
    #[must_use]
    pub fn execute(
        &self,
        kind: OperationKind,
        entity: &Arc<E>,
        options: RequestOptions<E>,
    ) -> Option<RequestHandle> {
        let RequestOptions {
            mode,
            payload,
            success,
            error,
        } = options;
        let mode = mode.unwrap_or_else(|| self.inner.read_defaults().mode_for(kind));
        let entity_id = entity.entity_id();

        // Held across dispatch and registration: a settlement racing in
        // from another task is processed strictly after the handle is
        // tracked.
        let mut tables = self.inner.lock_tables();
        let table = tables.entry(entity_id).or_default();
        table.ensure(kind);

        match policy::resolve(mode, table.pending(kind).len()) {
            Disposition::Suppress => {
                debug!("suppressed {kind} for {entity_id}: an earlier request is still in flight");
                return None;
            }
            Disposition::CancelThenDispatch => {
                let outstanding = table.pending(kind);
                debug!(
                    "aborting {} in-flight {kind} request(s) for {entity_id}",
                    outstanding.len()
                );
                // Oldest first. Handles stay tracked until their abort
                // settlement comes back through the error path.
                for handle in outstanding {
                    handle.abort_with(AbortReason::Superseded);
                }
            }
            Disposition::Dispatch => {}
        }

        let id = RequestId::new(self.inner.request_ids.fetch_add(1, Ordering::Relaxed));
        let success = self.wrap_success(entity_id, kind, id, success);
        let error = self.wrap_error(entity_id, kind, id, error);
        let canceller = self.inner.transport.dispatch(DispatchRequest {
            id,
            kind,
            entity: Arc::clone(entity),
            payload,
            success,
            error,
        });

        let handle = RequestHandle::new(id, kind, canceller);
        table.push(handle.clone());
        debug!("dispatched {kind} {id} for {entity_id} in {mode} mode");
        Some(handle)
    }

    // ── Convenience verbs ──────────────────────────────────────────────

    /// `read`: fetch the entity's current state.
    #[must_use]
    pub fn fetch(&self, entity: &Arc<E>, options: RequestOptions<E>) -> Option<RequestHandle> {
        self.execute(OperationKind::Read, entity, options)
    }

    /// `create`: persist a new entity.
    #[must_use]
    pub fn create(&self, entity: &Arc<E>, options: RequestOptions<E>) -> Option<RequestHandle> {
        self.execute(OperationKind::Create, entity, options)
    }

    /// `update`: persist the entity's full state.
    #[must_use]
    pub fn save(&self, entity: &Arc<E>, options: RequestOptions<E>) -> Option<RequestHandle> {
        self.execute(OperationKind::Update, entity, options)
    }

    /// `patch`: persist a partial update.
    #[must_use]
    pub fn patch(&self, entity: &Arc<E>, options: RequestOptions<E>) -> Option<RequestHandle> {
        self.execute(OperationKind::Patch, entity, options)
    }

    /// `delete`: remove the entity from the backend.
    #[must_use]
    pub fn destroy(&self, entity: &Arc<E>, options: RequestOptions<E>) -> Option<RequestHandle> {
        self.execute(OperationKind::Delete, entity, options)
    }

    // ── Introspection ──────────────────────────────────────────────────

    /// Ids of the outstanding requests of `kind` for this entity, oldest
    /// first.
    #[must_use]
    pub fn pending_requests(&self, entity: &E, kind: OperationKind) -> Vec<RequestId> {
        let tables = self.inner.lock_tables();
        tables
            .get(&entity.entity_id())
            .map(|table| table.pending(kind).iter().map(RequestHandle::id).collect())
            .unwrap_or_default()
    }

    /// Number of outstanding requests of `kind` for this entity.
    #[must_use]
    pub fn pending_count(&self, entity: &E, kind: OperationKind) -> usize {
        let tables = self.inner.lock_tables();
        tables
            .get(&entity.entity_id())
            .map(|table| table.pending(kind).len())
            .unwrap_or(0)
    }

    /// The entity's tracked table as plain data: every kind touched so far
    /// mapped to its outstanding request ids. Settled kinds stay present
    /// with an empty sequence; an entity never seen yields an empty map.
    #[must_use]
    pub fn snapshot(&self, entity: &E) -> HashMap<OperationKind, Vec<RequestId>> {
        let tables = self.inner.lock_tables();
        tables
            .get(&entity.entity_id())
            .map(RequestTable::snapshot)
            .unwrap_or_default()
    }

    // ── Configuration ──────────────────────────────────────────────────

    /// The default mode currently applied to `kind`.
    #[must_use]
    pub fn default_mode(&self, kind: OperationKind) -> Mode {
        self.inner.read_defaults().mode_for(kind)
    }

    /// Replaces the default mode for `kind`. Affects subsequent calls;
    /// requests already in flight are untouched.
    pub fn set_default_mode(&self, kind: OperationKind, mode: Mode) {
        self.inner.write_defaults().set(kind, mode);
    }

    /// A copy of the whole default-mode table.
    #[must_use]
    pub fn defaults(&self) -> ModeDefaults {
        *self.inner.read_defaults()
    }

    /// Replaces the whole default-mode table.
    pub fn set_defaults(&self, defaults: ModeDefaults) {
        *self.inner.write_defaults() = defaults;
    }

    /// The transport this gate delegates to.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport<E>> {
        &self.inner.transport
    }

    // ── Callback wrapping ──────────────────────────────────────────────

    /// Composes the caller's success callback with handle removal. The
    /// bookkeeping step runs first, then the original fires with its
    /// original arguments; a missing original still gets removal installed.
    fn wrap_success(
        &self,
        entity_id: EntityId,
        kind: OperationKind,
        id: RequestId,
        original: Option<SuccessCallback<E>>,
    ) -> SuccessCallback<E> {
        let gate = Arc::downgrade(&self.inner);
        Box::new(move |entity, body, meta| {
            remove_settled(&gate, entity_id, kind, id);
            if let Some(callback) = original {
                callback(entity, body, meta);
            }
        })
    }

    /// Error-path counterpart of [`SyncGate::wrap_success`]. Failures,
    /// aborts included, are forwarded to the original verbatim.
    fn wrap_error(
        &self,
        entity_id: EntityId,
        kind: OperationKind,
        id: RequestId,
        original: Option<ErrorCallback<E>>,
    ) -> ErrorCallback<E> {
        let gate = Arc::downgrade(&self.inner);
        Box::new(move |entity, failure, meta| {
            remove_settled(&gate, entity_id, kind, id);
            if let Some(callback) = original {
                callback(entity, failure, meta);
            }
        })
    }
}

impl<E> Clone for SyncGate<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> GateInner<E> {
    // A poisoned lock still holds a consistent table: every mutation is a
    // single insert or splice. Recover the guard instead of wedging
    // settlement.
    fn lock_tables(&self) -> MutexGuard<'_, HashMap<EntityId, RequestTable>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_defaults(&self) -> RwLockReadGuard<'_, ModeDefaults> {
        self.defaults.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_defaults(&self) -> RwLockWriteGuard<'_, ModeDefaults> {
        self.defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes a settled request from its entity's table. Never fails: a gate
/// that was dropped, or a handle already removed, leaves the original
/// callback's delivery untouched.
fn remove_settled<E>(
    gate: &Weak<GateInner<E>>,
    entity_id: EntityId,
    kind: OperationKind,
    id: RequestId,
) {
    let Some(inner) = gate.upgrade() else {
        trace!("settled {kind} {id} after its gate was dropped");
        return;
    };
    let mut tables = inner.lock_tables();
    let removed = tables
        .get_mut(&entity_id)
        .map(|table| table.remove(kind, id))
        .unwrap_or(false);
    if removed {
        trace!("settled {kind} {id} for {entity_id}");
    } else {
        warn!("settlement for untracked request {id} ({kind}, {entity_id})");
    }
}

//! Per-entity bookkeeping of outstanding requests.

use crate::kind::OperationKind;
use crate::request::{RequestHandle, RequestId};
use std::collections::HashMap;

/// Tracked request table: operation kind to outstanding handles in
/// submission order.
///
/// Kind entries are created lazily by the first operation of that kind and
/// never removed; a fully settled kind keeps an empty sequence. Handles
/// enter on dispatch and leave exactly once, when their settlement is
/// processed.
#[derive(Debug, Default)]
pub(crate) struct RequestTable {
    kinds: HashMap<OperationKind, Vec<RequestHandle>>,
}

impl RequestTable {
    /// Makes sure `kind` has a (possibly empty) sequence.
    pub(crate) fn ensure(&mut self, kind: OperationKind) {
        self.kinds.entry(kind).or_default();
    }

    /// Outstanding handles for `kind`, oldest first.
    pub(crate) fn pending(&self, kind: OperationKind) -> &[RequestHandle] {
        self.kinds.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends a freshly dispatched handle at the tail of its kind.
    pub(crate) fn push(&mut self, handle: RequestHandle) {
        self.kinds.entry(handle.kind()).or_default().push(handle);
    }

    /// Removes one settled handle. Returns false when the handle is not
    /// tracked; removal is idempotent.
    pub(crate) fn remove(&mut self, kind: OperationKind, id: RequestId) -> bool {
        let Some(sequence) = self.kinds.get_mut(&kind) else {
            return false;
        };
        match sequence.iter().position(|handle| handle.id() == id) {
            Some(index) => {
                sequence.remove(index);
                true
            }
            None => false,
        }
    }

    /// The table as plain data: every kind touched so far mapped to the
    /// ids of its outstanding requests, in submission order.
    pub(crate) fn snapshot(&self) -> HashMap<OperationKind, Vec<RequestId>> {
        self.kinds
            .iter()
            .map(|(kind, handles)| (*kind, handles.iter().map(RequestHandle::id).collect()))
            .collect()
    }
}

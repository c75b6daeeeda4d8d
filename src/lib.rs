//! Per-entity request concurrency gate for client data-layer frameworks.
//!
//! When a UI binds to shared models, nothing stops it from issuing the
//! same logical request twice before the first answer lands: a
//! double-clicked save button, a route change re-fetching a collection
//! mid-flight. `syncgate` decides, per entity and per operation kind, what
//! happens to the second request, and keeps the books on everything in
//! flight.
//!
//! # Components
//!
//! - **Modes** ([`Mode`], [`ModeDefaults`]): `force` dispatches
//!   unconditionally, `prevent` suppresses while an earlier request is in
//!   flight, `abort` displaces whatever is in flight. Reads default to
//!   `abort` (the latest fetch wins); writes default to `prevent` (the
//!   first save wins).
//! - **Policy resolver** ([`policy::resolve`], [`Disposition`]): a pure
//!   decision over the mode and the outstanding count.
//! - **Dispatch tracker** ([`SyncGate`]): a per-entity table of
//!   outstanding [`RequestHandle`]s. Callback wrapping removes each handle
//!   exactly once at settlement; abort sweeps run oldest first.
//! - **Transport** ([`Transport`]): the host's request primitive. The gate
//!   delegates every dispatch to it and never performs I/O itself.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use syncgate::transport::mock::MockTransport;
//! use syncgate::{EntityId, OperationKind, RequestOptions, SyncGate, Syncable};
//!
//! struct Profile {
//!     id: EntityId,
//! }
//!
//! impl Syncable for Profile {
//!     fn entity_id(&self) -> EntityId {
//!         self.id
//!     }
//! }
//!
//! let transport: MockTransport<Profile> = MockTransport::new();
//! let gate: SyncGate<Profile> = SyncGate::new(Arc::new(transport.clone()));
//! let profile = Arc::new(Profile { id: EntityId::new() });
//!
//! // The first fetch dispatches and is tracked.
//! let first = gate.fetch(&profile, RequestOptions::new());
//! assert!(first.is_some());
//! assert_eq!(gate.pending_count(&profile, OperationKind::Read), 1);
//!
//! // Reads default to abort mode: a second fetch displaces the first.
//! let second = gate.fetch(&profile, RequestOptions::new());
//! assert!(second.is_some());
//! assert_eq!(transport.abort_calls(0), 1);
//!
//! // Settlement removes each handle exactly once.
//! transport.flush_aborted();
//! transport.settle_success(1, serde_json::json!({ "name": "Ada" }));
//! assert_eq!(gate.pending_count(&profile, OperationKind::Read), 0);
//! ```

mod entity;
mod error;
mod gate;
mod kind;
mod mode;
mod options;
pub mod policy;
mod request;
mod table;
pub mod transport;

pub use entity::{EntityId, Syncable};
pub use error::{AbortReason, ConfigError, RequestFailure};
pub use gate::SyncGate;
pub use kind::OperationKind;
pub use mode::{Mode, ModeDefaults};
pub use options::{ErrorCallback, RequestOptions, SuccessCallback};
pub use policy::Disposition;
pub use request::{Abortable, RequestHandle, RequestId, ResponseMeta};
pub use transport::{DispatchRequest, Transport};

use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use syncgate::transport::mock::MockTransport;
use syncgate::{
    ConfigError, EntityId, Mode, ModeDefaults, OperationKind, RequestOptions, SyncGate, Syncable,
    Transport,
};

struct Item {
    id: EntityId,
}

impl Syncable for Item {
    fn entity_id(&self) -> EntityId {
        self.id
    }
}

fn setup() -> (SyncGate<Item>, MockTransport<Item>, Arc<Item>) {
    let transport: MockTransport<Item> = MockTransport::new();
    let gate = SyncGate::new(Arc::new(transport.clone()));
    (gate, transport, Arc::new(Item { id: EntityId::new() }))
}

// ── Default-mode table ────────────────────────────────────────────

#[test]
fn documented_defaults() {
    let defaults = ModeDefaults::default();

    assert_eq!(defaults.mode_for(OperationKind::Read), Mode::Abort);
    for kind in [
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Patch,
        OperationKind::Delete,
    ] {
        assert_eq!(defaults.mode_for(kind), Mode::Prevent);
    }
}

#[test]
fn set_replaces_one_entry() {
    let mut defaults = ModeDefaults::default();

    defaults.set(OperationKind::Delete, Mode::Force);

    assert_eq!(defaults.mode_for(OperationKind::Delete), Mode::Force);
    assert_eq!(defaults.mode_for(OperationKind::Update), Mode::Prevent);
}

#[test]
fn gate_defaults_are_mutable_at_runtime() {
    let (gate, transport, item) = setup();

    gate.set_default_mode(OperationKind::Read, Mode::Prevent);
    gate.fetch(&item, RequestOptions::new()).expect("first fetch dispatches");
    let second = gate.fetch(&item, RequestOptions::new());

    // Reads now prevent instead of aborting.
    assert!(second.is_none());
    assert_eq!(transport.abort_calls(0), 0);
    assert_eq!(gate.default_mode(OperationKind::Read), Mode::Prevent);
}

#[test]
fn custom_defaults_at_construction() {
    let transport: MockTransport<Item> = MockTransport::new();
    let mut defaults = ModeDefaults::default();
    defaults.set(OperationKind::Update, Mode::Force);
    let gate = SyncGate::with_defaults(Arc::new(transport.clone()), defaults);
    let item = Arc::new(Item { id: EntityId::new() });

    gate.save(&item, RequestOptions::new()).expect("first save dispatches");
    gate.save(&item, RequestOptions::new()).expect("forced updates stack");

    assert_eq!(transport.dispatch_count(), 2);
}

#[test]
fn replacing_the_whole_table() {
    let (gate, _, _) = setup();

    let mut defaults = gate.defaults();
    defaults.set(OperationKind::Read, Mode::Force);
    gate.set_defaults(defaults);

    assert_eq!(gate.default_mode(OperationKind::Read), Mode::Force);
    assert_eq!(gate.default_mode(OperationKind::Create), Mode::Prevent);
}

// ── Transport wiring ──────────────────────────────────────────────

#[test]
fn transport_accessor_exposes_the_wired_transport() {
    let mock: MockTransport<Item> = MockTransport::new();
    let wired: Arc<dyn Transport<Item>> = Arc::new(mock.clone());
    let gate = SyncGate::new(Arc::clone(&wired));
    let item = Arc::new(Item { id: EntityId::new() });

    gate.fetch(&item, RequestOptions::new()).expect("fetch dispatches");

    assert!(Arc::ptr_eq(gate.transport(), &wired));
    assert_eq!(mock.dispatch_count(), 1);
}

// ── String identifiers ────────────────────────────────────────────

#[test]
fn mode_identifiers_are_stable() {
    assert_eq!(Mode::Force.as_str(), "force");
    assert_eq!(Mode::Prevent.as_str(), "prevent");
    assert_eq!(Mode::Abort.as_str(), "abort");
}

#[test]
fn mode_round_trips_through_from_str() {
    for mode in [Mode::Force, Mode::Prevent, Mode::Abort] {
        assert_eq!(Mode::from_str(mode.as_str()).unwrap(), mode);
        assert_eq!(mode.to_string(), mode.as_str());
    }
}

#[test]
fn unknown_mode_fails_loudly() {
    let err = Mode::from_str("merge").unwrap_err();
    assert_eq!(err, ConfigError::UnknownMode("merge".to_string()));
}

#[test]
fn kind_identifiers_round_trip() {
    for kind in OperationKind::ALL {
        assert_eq!(OperationKind::from_str(kind.as_str()).unwrap(), kind);
        assert_eq!(kind.to_string(), kind.as_str());
    }
}

#[test]
fn unknown_kind_fails_loudly() {
    let err = OperationKind::from_str("upsert").unwrap_err();
    assert_eq!(err, ConfigError::UnknownKind("upsert".to_string()));
}

// ── Serde ─────────────────────────────────────────────────────────

#[test]
fn mode_serializes_to_its_identifier() {
    assert_eq!(serde_json::to_value(Mode::Abort).unwrap(), json!("abort"));
    assert_eq!(
        serde_json::from_value::<Mode>(json!("prevent")).unwrap(),
        Mode::Prevent
    );
}

#[test]
fn unknown_mode_string_is_rejected_by_serde() {
    assert!(serde_json::from_value::<Mode>(json!("retry")).is_err());
}

#[test]
fn defaults_table_loads_from_partial_config() {
    let defaults: ModeDefaults = serde_json::from_value(json!({"read": "prevent"})).unwrap();

    assert_eq!(defaults.mode_for(OperationKind::Read), Mode::Prevent);
    // Unlisted kinds keep their documented defaults.
    assert_eq!(defaults.mode_for(OperationKind::Create), Mode::Prevent);
    assert_eq!(defaults.mode_for(OperationKind::Update), Mode::Prevent);
}

#[test]
fn defaults_table_serializes_every_kind() {
    let value = serde_json::to_value(ModeDefaults::default()).unwrap();

    assert_eq!(
        value,
        json!({
            "read": "abort",
            "create": "prevent",
            "update": "prevent",
            "patch": "prevent",
            "delete": "prevent",
        })
    );
}

// crates/msel-forge-core/tests/state_store_unit.rs
// ============================================================================
// Module: State Store Unit Tests
// Description: Seeding idempotence, snapshots, attribution, and traversal.
// Purpose: Pin the enterprise template and status-write semantics.
// ============================================================================

//! State store tests over the in-memory graph backend.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use msel_forge_core::EntityId;
use msel_forge_core::EntityStatus;
use msel_forge_core::InjectId;
use msel_forge_core::InMemoryGraphStore;
use msel_forge_core::InfrastructureTemplate;
use msel_forge_core::StateStore;
use msel_forge_core::Timestamp;
use msel_forge_core::core::EntityType;

fn seeded_store() -> StateStore<InMemoryGraphStore> {
    let store = StateStore::new(InMemoryGraphStore::new());
    let count = store.seed_infrastructure(&InfrastructureTemplate::Enterprise).unwrap();
    assert_eq!(count, 40);
    store
}

#[test]
fn enterprise_seed_creates_exactly_the_canonical_ids() {
    let store = seeded_store();
    let snapshot = store.get_current_state(None).unwrap();
    assert_eq!(snapshot.len(), 40);

    let mut expected: Vec<String> = Vec::new();
    expected.extend((1..=5).map(|i| format!("SRV-CORE-{i:03}")));
    expected.extend((1..=15).map(|i| format!("SRV-APP-{i:03}")));
    expected.extend((1..=5).map(|i| format!("DB-PROD-{i:02}")));
    expected.extend((1..=5).map(|i| format!("DB-DEV-{i:02}")));
    expected.extend((1..=10).map(|i| format!("WS-FINANCE-{i:02}")));
    for id in expected {
        assert!(snapshot.contains_key(&EntityId::new(id.clone())), "missing {id}");
    }
}

#[test]
fn seeding_twice_is_idempotent() {
    let store = seeded_store();
    store
        .update_entity_status(
            &EntityId::new("SRV-CORE-001"),
            EntityStatus::Compromised,
            Some(&InjectId::parse("INJ-001").unwrap()),
            Timestamp::Tick(1),
        )
        .unwrap();

    let count = store.seed_infrastructure(&InfrastructureTemplate::Enterprise).unwrap();
    assert_eq!(count, 40);
    let snapshot = store.get_current_state(None).unwrap();
    assert_eq!(snapshot.len(), 40);
    for entity in snapshot.values() {
        assert_eq!(entity.status, EntityStatus::Online, "{} must be reseeded", entity.id);
        assert!(entity.last_updated_by_inject.is_none());
    }
}

#[test]
fn status_writes_attribute_the_triggering_inject() {
    let store = seeded_store();
    let inject_id = InjectId::parse("INJ-003").unwrap();
    let asset = EntityId::new("DB-PROD-01");
    store
        .update_entity_status(&asset, EntityStatus::Encrypted, Some(&inject_id), Timestamp::Tick(9))
        .unwrap();

    assert_eq!(store.get_entity_status(&asset).unwrap(), EntityStatus::Encrypted);
    let snapshot = store.get_current_state(None).unwrap();
    let entity = snapshot.get(&asset).unwrap();
    assert_eq!(entity.last_updated_by_inject.as_ref(), Some(&inject_id));
    assert_eq!(entity.last_updated, Timestamp::Tick(9));
}

#[test]
fn unknown_assets_surface_store_errors() {
    let store = seeded_store();
    assert!(store.get_entity_status(&EntityId::new("SRV-NOT-EXIST")).is_err());
    assert!(
        store
            .update_entity_status(
                &EntityId::new("SRV-NOT-EXIST"),
                EntityStatus::Offline,
                None,
                Timestamp::Tick(1),
            )
            .is_err()
    );
}

#[test]
fn one_hop_traversal_returns_outgoing_dependents() {
    let store = seeded_store();
    let dependents = store.get_affected_entities(&EntityId::new("SRV-APP-001")).unwrap();
    let ids: Vec<&str> = dependents.iter().map(|entity| entity.id.as_str()).collect();
    assert!(ids.contains(&"SRV-CORE-001"));
    assert!(ids.contains(&"DB-PROD-01"));
    assert!(!ids.contains(&"WS-FINANCE-01"), "incoming edges must not appear");
}

#[test]
fn snapshot_filter_selects_by_entity_type() {
    let store = seeded_store();
    let databases = store.get_current_state(Some(EntityType::Database)).unwrap();
    assert_eq!(databases.len(), 10);
    assert!(databases.keys().all(|id| id.as_str().starts_with("DB-")));
}

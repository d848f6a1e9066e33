// crates/msel-forge-store-graph/tests/cypher_store_unit.rs
// ============================================================================
// Module: Cypher Store Unit Tests
// Description: Statement wire forms, row mapping, and error propagation.
// Purpose: Validate the HTTP transaction adapter against a local mock.
// ============================================================================

//! Cypher graph store tests against a `tiny_http` mock server.

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

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use msel_forge_core::EntityId;
use msel_forge_core::EntityStatus;
use msel_forge_core::GraphStore;
use msel_forge_core::InjectId;
use msel_forge_core::Timestamp;
use msel_forge_store_graph::CypherGraphStore;
use msel_forge_store_graph::CypherStoreConfig;

/// Serves `count` canned bodies and records received request bodies.
fn serve(bodies: Vec<&'static str>, count: usize) -> (String, Arc<Mutex<Vec<String>>>) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("http server");
    let addr = format!("http://{}", server.server_addr());
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_writer = Arc::clone(&seen);
    thread::spawn(move || {
        for index in 0..count {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut body = String::new();
            let _ = request.as_reader().read_to_string(&mut body);
            seen_writer.lock().unwrap().push(body);
            let payload = bodies.get(index).copied().unwrap_or(r#"{"results": [], "errors": []}"#);
            let _ = request.respond(tiny_http::Response::from_string(payload));
        }
    });
    (addr, seen)
}

fn store(uri: String) -> CypherGraphStore {
    CypherGraphStore::new(CypherStoreConfig {
        uri,
        database: "neo4j".to_string(),
        user: "neo4j".to_string(),
        password: "secret".to_string(),
        timeout_ms: 5_000,
    })
    .unwrap()
}

const EMPTY_OK: &str = r#"{"results": [{"columns": [], "data": []}], "errors": []}"#;

#[test]
fn wipe_sends_the_canonical_detach_delete() {
    let (addr, seen) = serve(vec![EMPTY_OK], 1);
    store(addr).wipe().unwrap();
    let bodies = seen.lock().unwrap();
    assert!(bodies[0].contains("MATCH (n) DETACH DELETE n"));
}

#[test]
fn set_status_sends_attributed_update_and_detects_missing_entities() {
    let hit = r#"{"results": [{"columns": ["e.id"], "data": [{"row": ["SRV-001"]}]}], "errors": []}"#;
    let (addr, seen) = serve(vec![hit, EMPTY_OK], 2);
    let store = store(addr);

    store
        .set_status(
            &EntityId::new("SRV-001"),
            EntityStatus::Compromised,
            Some(&InjectId::parse("INJ-002").unwrap()),
            Timestamp::Tick(7),
        )
        .unwrap();
    let result = store.set_status(
        &EntityId::new("SRV-GONE"),
        EntityStatus::Offline,
        None,
        Timestamp::Tick(8),
    );
    assert!(result.is_err(), "missing entity must error");

    let bodies = seen.lock().unwrap();
    assert!(bodies[0].contains("SET e.status = $status"));
    assert!(bodies[0].contains("e.last_updated_by_inject = $inject"));
    assert!(bodies[0].contains("INJ-002"));
    assert!(bodies[0].contains("tick:7"));
}

#[test]
fn entity_rows_decode_into_core_records() {
    let body = r#"{"results": [{"columns": [], "data": [{"row": [
        "DB-PROD-01", "Database", "Production Database 1", "encrypted",
        "critical", "tick:9", "INJ-004"
    ]}]}], "errors": []}"#;
    let (addr, _seen) = serve(vec![body], 1);
    let entity = store(addr).entity(&EntityId::new("DB-PROD-01")).unwrap().unwrap();

    assert_eq!(entity.id.as_str(), "DB-PROD-01");
    assert_eq!(entity.status, EntityStatus::Encrypted);
    assert_eq!(entity.last_updated, Timestamp::Tick(9));
    assert_eq!(entity.last_updated_by_inject, Some(InjectId::parse("INJ-004").unwrap()));
}

#[test]
fn server_errors_map_to_statement_errors() {
    let body = r#"{"results": [], "errors": [{"code": "Neo.ClientError.Statement.SyntaxError",
        "message": "bad cypher"}]}"#;
    let (addr, _seen) = serve(vec![body], 1);
    let result = store(addr).entities();
    let err = result.unwrap_err();
    assert!(err.to_string().contains("SyntaxError"), "got {err}");
}

#[test]
fn invalid_uris_are_rejected_at_construction() {
    assert!(
        CypherGraphStore::new(CypherStoreConfig {
            uri: "bolt://localhost:7687".to_string(),
            database: "neo4j".to_string(),
            user: String::new(),
            password: String::new(),
            timeout_ms: 1_000,
        })
        .is_err()
    );
}

// crates/msel-forge-core/tests/inject_model_unit.rs
// ============================================================================
// Module: Inject Model Unit Tests
// Description: Wire-form serialization and identifier validation.
// Purpose: Pin the inject/scenario record formats consumed by exports.
// ============================================================================

//! Serde round-trip and identifier tests for the inject data model.

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

use msel_forge_core::CrisisPhase;
use msel_forge_core::EntityId;
use msel_forge_core::Inject;
use msel_forge_core::InjectId;
use msel_forge_core::Modality;
use msel_forge_core::Scenario;
use msel_forge_core::ScenarioId;
use msel_forge_core::ScenarioType;
use msel_forge_core::TechnicalMetadata;
use msel_forge_core::TimeOffset;
use msel_forge_core::Timestamp;
use msel_forge_core::TtpId;

fn sample_inject() -> Inject {
    Inject {
        inject_id: InjectId::parse("INJ-001").unwrap(),
        time_offset: TimeOffset::parse("T+00:15:00").unwrap(),
        phase: CrisisPhase::SuspiciousActivity,
        source: "Red Team".to_string(),
        target: "Blue Team / SOC".to_string(),
        modality: Modality::SiemAlert,
        content: "SIEM alert: anomalous login burst detected on SRV-001.".to_string(),
        technical_metadata: TechnicalMetadata {
            mitre_id: Some(TtpId::new("T1566")),
            affected_assets: vec![EntityId::new("SRV-001")],
            ioc_hash: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            ioc_ip: Some("203.0.113.7".to_string()),
            ioc_domain: None,
            severity: Some("medium".to_string()),
        },
        compliance_tag: Some("DORA".to_string()),
        business_impact: Some("None yet; monitoring.".to_string()),
        created_at: Timestamp::Wall(1_700_000_000_000),
    }
}

#[test]
fn inject_serde_round_trip_is_lossless() {
    let inject = sample_inject();
    let encoded = serde_json::to_string(&inject).unwrap();
    let decoded: Inject = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, inject);
}

#[test]
fn modality_serializes_with_human_labels() {
    let encoded = serde_json::to_string(&Modality::SiemAlert).unwrap();
    assert_eq!(encoded, "\"SIEM Alert\"");
    let decoded: Modality = serde_json::from_str("\"Phone Call\"").unwrap();
    assert_eq!(decoded, Modality::PhoneCall);
}

#[test]
fn inject_ids_enforce_the_wire_form() {
    assert!(InjectId::parse("INJ-001").is_ok());
    assert!(InjectId::parse("INJ-1234").is_ok());
    for bad in ["INJ-01", "inj-001", "INJ-0a1", "001", "INJ001"] {
        assert!(InjectId::parse(bad).is_err(), "{bad} must be rejected");
    }
    assert_eq!(InjectId::from_ordinal(7).as_str(), "INJ-007");
    assert_eq!(InjectId::from_ordinal(1234).as_str(), "INJ-1234");
}

#[test]
fn engine_assigned_scenario_ids_use_the_sequence_form() {
    assert_eq!(ScenarioId::from_sequence(1).as_str(), "scenario-0001");
    assert_eq!(ScenarioId::from_sequence(42).as_str(), "scenario-0042");
    assert_eq!(ScenarioId::from_sequence(12345).as_str(), "scenario-12345");
    // Caller-supplied ids pass through untouched.
    assert_eq!(ScenarioId::new("board-exercise-q3").as_str(), "board-exercise-q3");
}

#[test]
fn scenario_timeline_mirrors_accepted_injects() {
    let mut scenario = Scenario::new(
        ScenarioId::new("scn-test"),
        ScenarioType::RansomwareDoubleExtortion,
        Timestamp::start(),
    );
    scenario.injects.push(sample_inject());
    let timeline = scenario.to_timeline();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].inject_id, scenario.injects[0].inject_id);
    assert_eq!(timeline[0].content, scenario.injects[0].content);
    assert_eq!(scenario.last_offset(), Some(scenario.injects[0].time_offset));
}

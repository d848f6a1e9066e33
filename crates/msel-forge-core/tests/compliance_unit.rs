// crates/msel-forge-core/tests/compliance_unit.rs
// ============================================================================
// Module: Compliance Framework Unit Tests
// Description: Requirement applicability, satisfaction, and scoring.
// Purpose: Pin the built-in DORA/NIST/ISO checklists and their heuristics.
// ============================================================================

//! Compliance framework tests.

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
use msel_forge_core::Inject;
use msel_forge_core::InjectId;
use msel_forge_core::Modality;
use msel_forge_core::TechnicalMetadata;
use msel_forge_core::TimeOffset;
use msel_forge_core::Timestamp;
use msel_forge_core::builtin_framework;

fn inject(phase: CrisisPhase, content: &str) -> Inject {
    Inject {
        inject_id: InjectId::parse("INJ-001").unwrap(),
        time_offset: TimeOffset::from_seconds(0),
        phase,
        source: "Red Team".to_string(),
        target: "Blue Team / SOC".to_string(),
        modality: Modality::InternalReport,
        content: content.to_string(),
        technical_metadata: TechnicalMetadata::default(),
        compliance_tag: None,
        business_impact: None,
        created_at: Timestamp::start(),
    }
}

#[test]
fn builtin_names_resolve_case_insensitively() {
    assert!(builtin_framework("DORA").is_some());
    assert!(builtin_framework("dora").is_some());
    assert!(builtin_framework("NIST").is_some());
    assert!(builtin_framework("ISO27001").is_some());
    assert!(builtin_framework("SOX").is_none());
}

#[test]
fn detection_keywords_satisfy_the_dora_detection_requirement() {
    let dora = builtin_framework("DORA").unwrap();
    let satisfied = dora.evaluate(&inject(
        CrisisPhase::SuspiciousActivity,
        "SIEM alert detected and classified as a potential incident.",
    ));
    assert!(satisfied.missing_mandatory.is_empty());
    assert!(satisfied.score > 0.0);

    let missed = dora.evaluate(&inject(
        CrisisPhase::SuspiciousActivity,
        "Something vague happened overnight with no follow-up.",
    ));
    assert!(missed.missing_mandatory.iter().any(|id| id == "DORA-17"));
}

#[test]
fn requirements_outside_their_phase_do_not_apply() {
    let dora = builtin_framework("DORA").unwrap();
    // DORA-19 (authority reporting) applies to escalation/containment only;
    // a normal-operation inject scores clean without naming any regulator.
    let report = dora.evaluate(&inject(
        CrisisPhase::NormalOperation,
        "Routine operations; all services nominal.",
    ));
    assert!(report.missing_mandatory.is_empty());
    assert!((report.score - 1.0).abs() < f64::EPSILON);
}

#[test]
fn containment_keywords_satisfy_the_nist_containment_requirement() {
    let nist = builtin_framework("NIST").unwrap();
    let report = nist.evaluate(&inject(
        CrisisPhase::Containment,
        "Responders isolate the affected segment and block the C2 domain.",
    ));
    assert!(report.missing_mandatory.is_empty());
}

#[test]
fn compliance_tags_count_toward_satisfaction() {
    let nist = builtin_framework("NIST").unwrap();
    let mut event = inject(CrisisPhase::Containment, "Short status note for the record.");
    event.compliance_tag = Some("containment completed per playbook".to_string());
    let report = nist.evaluate(&event);
    assert!(report.missing_mandatory.is_empty());
}

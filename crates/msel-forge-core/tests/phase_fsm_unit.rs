// crates/msel-forge-core/tests/phase_fsm_unit.rs
// ============================================================================
// Module: Phase FSM Unit Tests
// Description: Successor table coverage for every crisis phase.
// Purpose: Pin the legal transition set so drift is caught immediately.
// ============================================================================

//! Transition-table tests for the crisis-phase state machine.

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

#[test]
fn successor_table_matches_the_playbook() {
    use CrisisPhase as P;
    let expected: [(P, &[P]); 6] = [
        (P::NormalOperation, &[P::SuspiciousActivity, P::InitialIncident]),
        (P::SuspiciousActivity, &[P::InitialIncident, P::NormalOperation]),
        (P::InitialIncident, &[P::EscalationCrisis, P::Containment]),
        (P::EscalationCrisis, &[P::Containment]),
        (P::Containment, &[P::Recovery, P::EscalationCrisis]),
        (P::Recovery, &[P::NormalOperation]),
    ];
    for (phase, successors) in expected {
        assert_eq!(phase.successors(), successors, "successors of {phase}");
    }
}

#[test]
fn staying_in_the_current_phase_is_always_legal() {
    for phase in CrisisPhase::ALL {
        assert!(phase.permits(phase), "{phase} must permit itself");
    }
}

#[test]
fn illegal_jumps_are_refused() {
    assert!(!CrisisPhase::NormalOperation.permits(CrisisPhase::Recovery));
    assert!(!CrisisPhase::NormalOperation.permits(CrisisPhase::EscalationCrisis));
    assert!(!CrisisPhase::EscalationCrisis.permits(CrisisPhase::NormalOperation));
    assert!(!CrisisPhase::Recovery.permits(CrisisPhase::Containment));
}

#[test]
fn labels_round_trip_through_serde() {
    for phase in CrisisPhase::ALL {
        let encoded = serde_json::to_string(&phase).unwrap();
        assert_eq!(encoded, format!("\"{}\"", phase.label()));
        let decoded: CrisisPhase = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, phase);
    }
}

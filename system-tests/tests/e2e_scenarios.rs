// system-tests/tests/e2e_scenarios.rs
// ============================================================================
// Module: End-to-End Scenario Tests
// Description: Seeding, generation, A/B measurement, and interactive flows.
// Purpose: Exercise the whole engine through its public API.
// ============================================================================

//! End-to-end scenarios: enterprise seeding, a minimal ransomware run,
//! hallucination rejection, temporal short-circuiting, the legacy/thesis A/B
//! pair, and the interactive decision effect.

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

use std::collections::BTreeSet;

use msel_forge_core::CrisisPhase;
use msel_forge_core::GenerateRequest;
use msel_forge_core::GenerationMode;
use msel_forge_core::InMemoryGraphStore;
use msel_forge_core::InfrastructureTemplate;
use msel_forge_core::ScenarioId;
use msel_forge_core::ScenarioType;
use msel_forge_core::StateStore;
use msel_forge_core::TEMPORAL_NO_LLM_MARKER;
use msel_forge_core::Timestamp;
use msel_forge_core::core::EntityId;
use msel_forge_core::core::EntityStatus;
use msel_forge_core::core::TraceEventKind;
use msel_forge_core::hallucinations_prevented;
use system_tests::ScriptedExerciseModel;
use system_tests::build_engine;
use system_tests::draft_json;
use system_tests::small_estate;

fn request(scenario_id: &str, max_iterations: u32, mode: GenerationMode) -> GenerateRequest {
    GenerateRequest {
        scenario_type: ScenarioType::RansomwareDoubleExtortion,
        scenario_id: Some(ScenarioId::new(scenario_id)),
        max_iterations,
        mode,
        interactive: false,
        compliance_standards: vec!["DORA".to_string()],
        start_time: Timestamp::start(),
    }
}

// ============================================================================
// SECTION: E1 - Enterprise Seed
// ============================================================================

#[test]
fn e1_enterprise_seed_creates_the_canonical_forty() {
    let store = StateStore::new(InMemoryGraphStore::new());
    let count = store.seed_infrastructure(&InfrastructureTemplate::Enterprise).unwrap();
    assert_eq!(count, 40);

    let snapshot = store.get_current_state(None).unwrap();
    let mut expected: BTreeSet<String> = BTreeSet::new();
    expected.extend((1..=5).map(|i| format!("SRV-CORE-{i:03}")));
    expected.extend((1..=15).map(|i| format!("SRV-APP-{i:03}")));
    expected.extend((1..=5).map(|i| format!("DB-PROD-{i:02}")));
    expected.extend((1..=5).map(|i| format!("DB-DEV-{i:02}")));
    expected.extend((1..=10).map(|i| format!("WS-FINANCE-{i:02}")));
    let actual: BTreeSet<String> =
        snapshot.keys().map(|id| id.as_str().to_string()).collect();
    assert_eq!(actual, expected);
}

// ============================================================================
// SECTION: E2 - Minimal Ransomware Run
// ============================================================================

#[test]
fn e2_minimal_ransomware_run_stays_on_known_assets_in_phase_order() {
    let model = ScriptedExerciseModel::new(Vec::new(), "SRV-001");
    let (engine, _trace) = build_engine(model);
    engine.seed_infrastructure(&small_estate()).unwrap();

    let report =
        engine.generate_scenario(&request("e2-run", 3, GenerationMode::Thesis)).unwrap();

    assert!(report.injects.len() >= 3);
    let first_phase = report.injects[0].phase;
    assert!(matches!(
        first_phase,
        CrisisPhase::NormalOperation | CrisisPhase::SuspiciousActivity
    ));
    for pair in report.injects.windows(2) {
        assert!(pair[0].phase.permits(pair[1].phase));
        assert!(pair[0].time_offset <= pair[1].time_offset);
    }
    let known = ["SRV-001", "SRV-002", "APP-001", "APP-002"];
    for inject in &report.injects {
        for asset in &inject.technical_metadata.affected_assets {
            assert!(known.contains(&asset.as_str()), "unknown asset {asset}");
        }
    }
}

// ============================================================================
// SECTION: E3 - Asset Hallucination Rejection
// ============================================================================

#[test]
fn e3_hallucinated_assets_are_rejected_and_fed_back() {
    let bad = draft_json(
        "INJ-001",
        "T+00:05:00",
        "SUSPICIOUS_ACTIVITY",
        "Unusual process activity reported on SRV-PAY-99.",
        "SRV-PAY-99",
    );
    let model = ScriptedExerciseModel::new(vec![bad], "SRV-001");
    let (engine, trace) = build_engine(model.clone());
    engine.seed_infrastructure(&small_estate()).unwrap();

    let report =
        engine.generate_scenario(&request("e3-run", 1, GenerationMode::Thesis)).unwrap();
    assert_eq!(report.injects.len(), 1);
    assert_eq!(report.injects[0].technical_metadata.affected_assets[0].as_str(), "SRV-001");

    let records = trace.snapshot();
    let rejection = records
        .iter()
        .find(|record| record.event_type == TraceEventKind::Critic
            && record.details["decision"] == "reject")
        .expect("a critic rejection must be traced");
    let errors = rejection.details["errors"].to_string();
    assert!(errors.contains("asset not found: SRV-PAY-99"));
    assert!(
        records.iter().any(|record| record.event_type == TraceEventKind::Refined),
        "the refine counter must increment"
    );

    let generator_prompts = model.generator_prompts();
    assert!(generator_prompts.len() >= 2);
    assert!(generator_prompts[1].contains("Previous attempt rejected for:"));
    assert!(generator_prompts[1].contains("asset not found: SRV-PAY-99"));
}

// ============================================================================
// SECTION: E4 - Temporal Regression Without a Model Call
// ============================================================================

#[test]
fn e4_temporal_regression_short_circuits_the_model_call() {
    let drafts = vec![
        draft_json(
            "INJ-001",
            "T+00:06:00",
            "SUSPICIOUS_ACTIVITY",
            "First anomaly confirmed on SRV-001 by the SOC.",
            "SRV-001",
        ),
        draft_json(
            "INJ-002",
            "T+00:04:45",
            "SUSPICIOUS_ACTIVITY",
            "Backdated alert about SRV-001 arrives out of order.",
            "SRV-001",
        ),
    ];
    let model = ScriptedExerciseModel::new(drafts, "SRV-001");
    let (engine, trace) = build_engine(model);
    engine.seed_infrastructure(&small_estate()).unwrap();

    let report =
        engine.generate_scenario(&request("e4-run", 2, GenerationMode::Thesis)).unwrap();
    assert_eq!(report.injects.len(), 2);
    assert!(report.injects[0].time_offset <= report.injects[1].time_offset);

    let records = trace.snapshot();
    let temporal_audit = records
        .iter()
        .find(|record| {
            record.event_type == TraceEventKind::Critic
                && record.details["llm_response"] == TEMPORAL_NO_LLM_MARKER
        })
        .expect("the temporal rejection must carry the no-call marker");
    assert_eq!(temporal_audit.details["decision"], "reject");
}

// ============================================================================
// SECTION: E5 - Legacy vs Thesis A/B
// ============================================================================

#[test]
fn e5_legacy_accepts_hallucinations_that_thesis_prevents() {
    let bad = || {
        draft_json(
            "INJ-001",
            "T+00:05:00",
            "SUSPICIOUS_ACTIVITY",
            "Alert names the nonexistent host SRV-GHOST-01.",
            "SRV-GHOST-01",
        )
    };

    let legacy_model = ScriptedExerciseModel::new(vec![bad()], "SRV-001");
    let (legacy_engine, _trace) = build_engine(legacy_model);
    legacy_engine.seed_infrastructure(&small_estate()).unwrap();
    let legacy =
        legacy_engine.generate_scenario(&request("e5-ab", 2, GenerationMode::Legacy)).unwrap();

    let thesis_model = ScriptedExerciseModel::new(vec![bad()], "SRV-001");
    let (thesis_engine, _trace) = build_engine(thesis_model);
    thesis_engine.seed_infrastructure(&small_estate()).unwrap();
    let thesis =
        thesis_engine.generate_scenario(&request("e5-ab", 2, GenerationMode::Thesis)).unwrap();

    // Legacy accepted every draft unconditionally, hallucination included.
    assert!(legacy
        .injects
        .iter()
        .any(|inject| inject.technical_metadata.affected_assets.iter().any(|asset| {
            asset.as_str() == "SRV-GHOST-01"
        })));
    // Thesis kept the timeline on known assets.
    assert!(thesis.injects.iter().all(|inject| {
        inject.technical_metadata.affected_assets.iter().all(|asset| {
            asset.as_str() != "SRV-GHOST-01"
        })
    }));

    let known: BTreeSet<EntityId> =
        ["SRV-001", "SRV-002", "APP-001", "APP-002"].iter().map(|id| EntityId::new(*id)).collect();
    let prevented = hallucinations_prevented(&legacy.injects, &thesis.injects, &known);
    assert!(prevented >= 1, "expected at least one prevented hallucination");
}

// ============================================================================
// SECTION: E6 - Interactive Decision Effect
// ============================================================================

#[test]
fn e6_decision_effects_shape_the_next_generation() {
    let drafts = vec![
        draft_json(
            "INJ-001",
            "T+00:05:00",
            "SUSPICIOUS_ACTIVITY",
            "Odd beaconing observed from SRV-001 by the SOC.",
            "SRV-001",
        ),
        draft_json(
            "INJ-002",
            "T+00:15:00",
            "INITIAL_INCIDENT",
            "Breach confirmed on SRV-001; foothold established.",
            "SRV-001",
        ),
    ];
    // Post-decision drafts target APP-001 instead of the isolated server.
    let model = ScriptedExerciseModel::new(drafts, "APP-001");
    let (engine, _trace) = build_engine(model.clone());
    engine.seed_infrastructure(&small_estate()).unwrap();

    let mut request = request("e6-run", 6, GenerationMode::Thesis);
    request.interactive = true;
    let report = engine.generate_scenario(&request).unwrap();

    let pending = report.pending_decision.expect("run must suspend after inject 2");
    assert_eq!(pending.after_inject, 2);
    let isolate = pending
        .options
        .iter()
        .find(|option| option.choice_id.as_str() == "isolate-suspect")
        .expect("isolate option must exist");

    let resumed =
        engine.supply_decision(&ScenarioId::new("e6-run"), &isolate.choice_id).unwrap();
    assert_eq!(
        resumed.system_state.get(&EntityId::new("SRV-001")).map(|entity| entity.status),
        Some(EntityStatus::Offline)
    );

    // The next generator prompt sees the isolated server.
    let prompts = model.generator_prompts();
    let post_decision = prompts.last().expect("a generator ran after the decision");
    assert!(post_decision.contains("SRV-001 (SRV-001 host, status: offline)"));

    // Injects accepted after the decision do not target the isolated server.
    for inject in resumed.injects.iter().skip(2) {
        assert!(inject
            .technical_metadata
            .affected_assets
            .iter()
            .all(|asset| asset.as_str() != "SRV-001"));
    }
}

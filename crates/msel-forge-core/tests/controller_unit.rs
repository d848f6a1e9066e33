// crates/msel-forge-core/tests/controller_unit.rs
// ============================================================================
// Module: Controller Unit Tests
// Description: Refine loops, termination order, decisions, and feedback flow.
// Purpose: Validate the state machine with synthetic agent responses.
// ============================================================================

//! Controller and engine tests driven by a scripted language model.

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

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use msel_forge_core::ChoiceId;
use msel_forge_core::Controller;
use msel_forge_core::ControllerConfig;
use msel_forge_core::CriticAgent;
use msel_forge_core::Engine;
use msel_forge_core::EntityStatus;
use msel_forge_core::GenerateRequest;
use msel_forge_core::GenerationMode;
use msel_forge_core::InMemoryGraphStore;
use msel_forge_core::InfrastructureTemplate;
use msel_forge_core::IntelProvider;
use msel_forge_core::LanguageModel;
use msel_forge_core::LlmError;
use msel_forge_core::LlmRequest;
use msel_forge_core::ScenarioId;
use msel_forge_core::ScenarioType;
use msel_forge_core::StateStore;
use msel_forge_core::TimeOffset;
use msel_forge_core::Timestamp;
use msel_forge_core::VectorStore;
use msel_forge_core::core::Criticality;
use msel_forge_core::core::Entity;
use msel_forge_core::core::EntityId;
use msel_forge_core::core::EntityType;
use msel_forge_core::core::MemoryTraceSink;
use msel_forge_core::core::TraceEventKind;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

/// Vector store that never answers, forcing the curated fallback.
struct NoVector;

impl VectorStore for NoVector {
    fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<msel_forge_core::TtpHit>, msel_forge_core::IntelError> {
        Ok(Vec::new())
    }
}

/// Scripted model: queued generator drafts, canned manager/critic verdicts.
///
/// When the draft queue runs dry a well-formed draft is synthesized from the
/// constraints stated in the generator prompt, so happy-path runs never
/// depend on queue length.
#[derive(Clone)]
struct ScriptedModel {
    drafts: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    fn new(drafts: Vec<String>) -> Self {
        Self {
            drafts: Arc::new(Mutex::new(drafts.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn generator_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|prompt| prompt.contains("scripting one inject"))
            .collect()
    }
}

impl LanguageModel for ScriptedModel {
    fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if request.prompt.contains("exercise director") {
            return Ok(r#"{"next_goal": "probe the estate", "target_phase": "SUSPICIOUS_ACTIVITY",
                "rationale": "build tension slowly", "suggested_assets": []}"#
                .to_string());
        }
        if request.prompt.contains("auditing one draft") {
            return Ok(r#"{"logical_consistency": true, "regulatory_compliance": true,
                "causal_validity": true, "errors": [], "warnings": []}"#
                .to_string());
        }
        let mut queue = self.drafts.lock().unwrap();
        if let Some(draft) = queue.pop_front() {
            return Ok(draft);
        }
        Ok(synthesize_draft(&request.prompt))
    }
}

/// Extracts the token following `marker` on its line in the prompt.
fn prompt_token(prompt: &str, marker: &str) -> Option<String> {
    prompt
        .lines()
        .find(|line| line.contains(marker))
        .and_then(|line| line.split(marker).nth(1))
        .map(|rest| rest.trim().to_string())
}

/// Builds a well-formed draft satisfying the prompt's stated constraints.
fn synthesize_draft(prompt: &str) -> String {
    let inject_id = prompt_token(prompt, "inject_id must be exactly ").unwrap_or_default();
    let phase = prompt_token(prompt, "phase must be ").unwrap_or_default();
    let min_offset = prompt_token(prompt, "not earlier than ")
        .and_then(|raw| TimeOffset::parse(&raw).ok())
        .unwrap_or(TimeOffset::from_seconds(0));
    let offset = min_offset.advanced_by(300);
    format!(
        r#"{{"inject_id": "{inject_id}", "time_offset": "{offset}", "phase": "{phase}",
            "source": "Red Team", "target": "Blue Team / SOC", "modality": "SIEM Alert",
            "content": "SIEM alert: anomaly observed on SRV-001 during monitoring.",
            "technical_metadata": {{"affected_assets": ["SRV-001"]}}}}"#
    )
}

/// A hand-written draft JSON with explicit fields.
fn draft_json(inject_id: &str, offset: &str, phase: &str, content: &str, asset: &str) -> String {
    format!(
        r#"{{"inject_id": "{inject_id}", "time_offset": "{offset}", "phase": "{phase}",
            "source": "Red Team", "target": "Blue Team / SOC", "modality": "SIEM Alert",
            "content": "{content}",
            "technical_metadata": {{"affected_assets": ["{asset}"]}}}}"#
    )
}

/// Four-asset estate used by the minimal runs.
fn small_estate() -> InfrastructureTemplate {
    let entities = ["SRV-001", "SRV-002", "APP-001", "APP-002"]
        .iter()
        .map(|id| Entity::seeded(*id, EntityType::Server, format!("{id} host"), Criticality::High))
        .collect();
    InfrastructureTemplate::Custom {
        entities,
        relationships: Vec::new(),
    }
}

type TestEngine = Engine<ScriptedModel, InMemoryGraphStore, NoVector, MemoryTraceSink>;

fn engine_with(model: ScriptedModel) -> (TestEngine, MemoryTraceSink) {
    let trace = MemoryTraceSink::new();
    let controller = Controller::new(
        model,
        StateStore::new(InMemoryGraphStore::new()),
        IntelProvider::<NoVector>::curated_only(),
        trace.clone(),
        CriticAgent::with_builtins(),
        ControllerConfig::default(),
    );
    let engine = Engine::new(controller);
    engine.seed_infrastructure(&small_estate()).unwrap();
    (engine, trace)
}

fn request(max_iterations: u32) -> GenerateRequest {
    GenerateRequest {
        scenario_type: ScenarioType::RansomwareDoubleExtortion,
        scenario_id: Some(ScenarioId::new("scn-test")),
        max_iterations,
        mode: GenerationMode::Thesis,
        interactive: false,
        compliance_standards: Vec::new(),
        start_time: Timestamp::start(),
    }
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[test]
fn minimal_run_produces_the_budgeted_injects_in_order() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, trace) = engine_with(model);
    let report = engine.generate_scenario(&request(3)).unwrap();

    assert_eq!(report.injects.len(), 3);
    assert!(report.end_condition.is_some());
    let known = ["SRV-001", "SRV-002", "APP-001", "APP-002"];
    for pair in report.injects.windows(2) {
        assert!(pair[0].time_offset <= pair[1].time_offset);
        assert!(pair[0].phase.permits(pair[1].phase));
    }
    for inject in &report.injects {
        for asset in &inject.technical_metadata.affected_assets {
            assert!(known.contains(&asset.as_str()), "unexpected asset {asset}");
        }
    }
    let kinds: Vec<TraceEventKind> =
        trace.snapshot().into_iter().map(|record| record.event_type).collect();
    assert!(kinds.contains(&TraceEventKind::Draft));
    assert!(kinds.contains(&TraceEventKind::Critic));
    assert!(kinds.contains(&TraceEventKind::StateUpdate));
}

#[test]
fn max_iterations_of_one_yields_a_single_inject() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, _trace) = engine_with(model);
    let report = engine.generate_scenario(&request(1)).unwrap();
    assert_eq!(report.injects.len(), 1);
}

#[test]
fn repeating_a_scenario_id_returns_the_recorded_run() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, _trace) = engine_with(model);
    let first = engine.generate_scenario(&request(2)).unwrap();
    let second = engine.generate_scenario(&request(2)).unwrap();
    assert_eq!(first.injects, second.injects);
    assert_eq!(engine.list_scenarios().unwrap().len(), 1);
}

// ============================================================================
// SECTION: Refine Loop
// ============================================================================

#[test]
fn rejection_feeds_verbatim_feedback_into_the_next_generator_prompt() {
    let bad = draft_json(
        "INJ-001",
        "T+00:05:00",
        "SUSPICIOUS_ACTIVITY",
        "Anomaly traced to SRV-PAY-99 by the monitoring team.",
        "SRV-PAY-99",
    );
    let model = ScriptedModel::new(vec![bad]);
    let (engine, trace) = engine_with(model.clone());
    let report = engine.generate_scenario(&request(1)).unwrap();

    assert_eq!(report.injects.len(), 1);
    let generator_prompts = model.generator_prompts();
    assert!(generator_prompts.len() >= 2);
    assert!(generator_prompts[1].contains("Previous attempt rejected for:"));
    assert!(generator_prompts[1].contains("asset not found: SRV-PAY-99"));
    assert!(
        trace.snapshot().iter().any(|record| record.event_type == TraceEventKind::Refined),
        "a refine record must be traced"
    );
}

#[test]
fn refine_budget_exhaustion_accepts_the_third_attempt_with_a_warning() {
    let bad = |n: u32| {
        draft_json(
            "INJ-001",
            "T+00:05:00",
            "SUSPICIOUS_ACTIVITY",
            &format!("Attempt {n} still names the ghost host SRV-PAY-99."),
            "SRV-PAY-99",
        )
    };
    let model = ScriptedModel::new(vec![bad(1), bad(2), bad(3)]);
    let (engine, _trace) = engine_with(model);
    let report = engine.generate_scenario(&request(1)).unwrap();

    assert_eq!(report.injects.len(), 1);
    assert_eq!(
        report.injects[0].technical_metadata.affected_assets[0].as_str(),
        "SRV-PAY-99"
    );
    assert!(
        report.warnings.iter().any(|warning| warning.contains("accepted after 2 refine attempts"))
    );
}

// ============================================================================
// SECTION: Termination Order
// ============================================================================

#[test]
fn recovery_phase_ends_the_run_once_the_timeline_is_sufficient() {
    let drafts = vec![
        draft_json(
            "INJ-001",
            "T+00:05:00",
            "INITIAL_INCIDENT",
            "Confirmed intrusion on SRV-001 after phishing success.",
            "SRV-001",
        ),
        draft_json(
            "INJ-002",
            "T+00:20:00",
            "CONTAINMENT",
            "SRV-001 isolated and credentials rotated by responders.",
            "SRV-001",
        ),
        draft_json(
            "INJ-003",
            "T+01:00:00",
            "RECOVERY",
            "Services restored on SRV-001; monitoring heightened.",
            "SRV-001",
        ),
    ];
    let model = ScriptedModel::new(drafts);
    let (engine, _trace) = engine_with(model);
    let report = engine.generate_scenario(&request(4)).unwrap();

    assert_eq!(report.injects.len(), 3);
    assert_eq!(
        report.end_condition,
        Some(msel_forge_core::core::EndCondition::RecoveryComplete)
    );
}

// ============================================================================
// SECTION: Interactive Decisions
// ============================================================================

fn interactive_request() -> GenerateRequest {
    GenerateRequest {
        interactive: true,
        ..request(6)
    }
}

#[test]
fn interactive_runs_suspend_after_the_second_inject() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, _trace) = engine_with(model);
    let report = engine.generate_scenario(&interactive_request()).unwrap();

    assert_eq!(report.injects.len(), 2);
    let pending = report.pending_decision.expect("run must suspend");
    assert_eq!(pending.after_inject, 2);
    assert!(!pending.options.is_empty());
    assert!(report.end_condition.is_none());
}

#[test]
fn decision_effects_reach_the_next_generator_snapshot() {
    // The second inject compromises SRV-001 so the isolate option targets it.
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
            "Breach confirmed on SRV-001; attacker foothold established.",
            "SRV-001",
        ),
    ];
    let model = ScriptedModel::new(drafts);
    let (engine, _trace) = engine_with(model.clone());
    let report = engine.generate_scenario(&interactive_request()).unwrap();
    let pending = report.pending_decision.expect("run must suspend");
    let isolate = pending
        .options
        .iter()
        .find(|option| option.choice_id.as_str() == "isolate-suspect")
        .expect("isolate option must exist");

    let resumed = engine
        .supply_decision(&ScenarioId::new("scn-test"), &isolate.choice_id)
        .unwrap();

    assert_eq!(resumed.user_decisions.len(), 1);
    assert_eq!(
        resumed.system_state.get(&EntityId::new("SRV-001")).map(|entity| entity.status),
        Some(EntityStatus::Offline)
    );
    let prompts_after = model.generator_prompts();
    let last = prompts_after.last().expect("a generator ran after the decision");
    assert!(last.contains("SRV-001 (SRV-001 host, status: offline)"));
}

#[test]
fn unknown_choices_are_refused() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, _trace) = engine_with(model);
    engine.generate_scenario(&interactive_request()).unwrap();
    let result =
        engine.supply_decision(&ScenarioId::new("scn-test"), &ChoiceId::new("not-a-choice"));
    assert!(result.is_err());
}

// ============================================================================
// SECTION: User Feedback
// ============================================================================

#[test]
fn user_feedback_reaches_exactly_one_generation() {
    let model = ScriptedModel::new(Vec::new());
    let (engine, _trace) = engine_with(model.clone());
    let report = engine.generate_scenario(&interactive_request()).unwrap();
    let pending = report.pending_decision.expect("run must suspend");

    engine
        .set_user_feedback(
            &ScenarioId::new("scn-test"),
            "Isolated SRV-001 and reset all service credentials",
        )
        .unwrap();
    let choice = pending.options[0].choice_id.clone();
    engine.supply_decision(&ScenarioId::new("scn-test"), &choice).unwrap();

    let generator_prompts = model.generator_prompts();
    let with_feedback: Vec<&String> = generator_prompts
        .iter()
        .filter(|prompt| prompt.contains("Incident Response Team performed:"))
        .collect();
    assert_eq!(with_feedback.len(), 1, "feedback must reach exactly one generation");
    assert!(with_feedback[0].contains("Isolated SRV-001"));
}

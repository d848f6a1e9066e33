// system-tests/src/lib.rs
// ============================================================================
// Module: MSEL Forge System Test Fixtures
// Description: Scripted model, estates, and engine builders for E2E tests.
// Purpose: Share deterministic fixtures across the end-to-end scenarios.
// Dependencies: msel-forge-core
// ============================================================================

//! ## Overview
//! System tests drive the public engine API with a scripted language model:
//! queued generator drafts play first, then well-formed drafts synthesized
//! from the constraints in the generator prompt. Manager and critic calls
//! receive canned, well-formed verdicts, so every symbolic decision in a run
//! is a pure function of the scripted drafts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use msel_forge_core::Controller;
use msel_forge_core::ControllerConfig;
use msel_forge_core::CriticAgent;
use msel_forge_core::Engine;
use msel_forge_core::InMemoryGraphStore;
use msel_forge_core::InfrastructureTemplate;
use msel_forge_core::IntelError;
use msel_forge_core::IntelProvider;
use msel_forge_core::LanguageModel;
use msel_forge_core::LlmError;
use msel_forge_core::LlmRequest;
use msel_forge_core::StateStore;
use msel_forge_core::TimeOffset;
use msel_forge_core::TtpHit;
use msel_forge_core::VectorStore;
use msel_forge_core::core::Criticality;
use msel_forge_core::core::Entity;
use msel_forge_core::core::EntityType;
use msel_forge_core::core::MemoryTraceSink;

// ============================================================================
// SECTION: Scripted Model
// ============================================================================

/// Scripted model: queued drafts first, synthesized drafts afterwards.
#[derive(Clone)]
pub struct ScriptedExerciseModel {
    /// Queued generator responses.
    drafts: Arc<Mutex<VecDeque<String>>>,
    /// Every prompt received, in order.
    prompts: Arc<Mutex<Vec<String>>>,
    /// Asset named by synthesized drafts.
    default_asset: &'static str,
}

impl ScriptedExerciseModel {
    /// Creates a model with queued drafts targeting `default_asset` afterwards.
    #[must_use]
    pub fn new(drafts: Vec<String>, default_asset: &'static str) -> Self {
        Self {
            drafts: Arc::new(Mutex::new(drafts.into())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_asset,
        }
    }

    /// Returns every prompt received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the generator prompts received so far.
    #[must_use]
    pub fn generator_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|prompt| prompt.contains("scripting one inject"))
            .collect()
    }
}

impl LanguageModel for ScriptedExerciseModel {
    fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError> {
        if let Ok(mut guard) = self.prompts.lock() {
            guard.push(request.prompt.clone());
        }
        if request.prompt.contains("exercise director") {
            return Ok(r#"{"next_goal": "advance the incident", "target_phase": "SUSPICIOUS_ACTIVITY",
                "rationale": "scripted", "suggested_assets": []}"#
                .to_string());
        }
        if request.prompt.contains("auditing one draft") {
            return Ok(r#"{"logical_consistency": true, "regulatory_compliance": true,
                "causal_validity": true, "errors": [], "warnings": []}"#
                .to_string());
        }
        if let Ok(mut guard) = self.drafts.lock()
            && let Some(draft) = guard.pop_front()
        {
            return Ok(draft);
        }
        Ok(synthesize_draft(&request.prompt, self.default_asset))
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
fn synthesize_draft(prompt: &str, asset: &str) -> String {
    let inject_id = prompt_token(prompt, "inject_id must be exactly ").unwrap_or_default();
    let phase = prompt_token(prompt, "phase must be ").unwrap_or_default();
    let min_offset = prompt_token(prompt, "not earlier than ")
        .and_then(|raw| TimeOffset::parse(&raw).ok())
        .unwrap_or(TimeOffset::from_seconds(0));
    let offset = min_offset.advanced_by(300);
    draft_json(
        &inject_id,
        &offset.to_string(),
        &phase,
        &format!("SIEM alert: anomaly observed on {asset} during monitoring."),
        asset,
    )
}

/// A hand-written draft JSON with explicit fields.
#[must_use]
pub fn draft_json(inject_id: &str, offset: &str, phase: &str, content: &str, asset: &str) -> String {
    format!(
        r#"{{"inject_id": "{inject_id}", "time_offset": "{offset}", "phase": "{phase}",
            "source": "Red Team", "target": "Blue Team / SOC", "modality": "SIEM Alert",
            "content": "{content}",
            "technical_metadata": {{"affected_assets": ["{asset}"]}}}}"#
    )
}

// ============================================================================
// SECTION: Estates and Engines
// ============================================================================

/// Vector store that never answers, forcing the curated fallback.
pub struct NoVector;

impl VectorStore for NoVector {
    fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<TtpHit>, IntelError> {
        Ok(Vec::new())
    }
}

/// The minimal four-asset estate used by the E2-style runs.
#[must_use]
pub fn small_estate() -> InfrastructureTemplate {
    let entities = ["SRV-001", "SRV-002", "APP-001", "APP-002"]
        .iter()
        .map(|id| Entity::seeded(*id, EntityType::Server, format!("{id} host"), Criticality::High))
        .collect();
    InfrastructureTemplate::Custom {
        entities,
        relationships: Vec::new(),
    }
}

/// Engine type used across the system tests.
pub type TestEngine = Engine<ScriptedExerciseModel, InMemoryGraphStore, NoVector, MemoryTraceSink>;

/// Builds an engine over the scripted model and an unseeded in-memory graph.
#[must_use]
pub fn build_engine(model: ScriptedExerciseModel) -> (TestEngine, MemoryTraceSink) {
    let trace = MemoryTraceSink::new();
    let controller = Controller::new(
        model,
        StateStore::new(InMemoryGraphStore::new()),
        IntelProvider::<NoVector>::curated_only(),
        trace.clone(),
        CriticAgent::with_builtins(),
        ControllerConfig::default(),
    );
    (Engine::new(controller), trace)
}

// crates/msel-forge-core/src/runtime/engine.rs
// ============================================================================
// Module: MSEL Forge Engine
// Description: Public generation API over the controller and a run registry.
// Purpose: Expose generate/resume/inspect operations with suspension support.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The engine is the public API of the core, consumed by CLI and service
//! surfaces. It wraps the controller's two run halves with an in-memory
//! scenario registry so interactive runs can suspend at decision points and
//! resume later. Runs are idempotent with respect to scenario id: repeating
//! a request for an existing id returns the recorded run instead of starting
//! a new one. Mid-run failures never raise to the caller; they are visible
//! in the returned errors, warnings, and workflow logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::ChoiceId;
use crate::core::EndCondition;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::GenerationMode;
use crate::core::Inject;
use crate::core::PendingDecision;
use crate::core::Scenario;
use crate::core::ScenarioId;
use crate::core::ScenarioType;
use crate::core::Timestamp;
use crate::core::TraceSink;
use crate::core::UserDecision;
use crate::core::WorkflowState;
use crate::interfaces::GraphStore;
use crate::interfaces::LanguageModel;
use crate::interfaces::StoreError;
use crate::interfaces::VectorStore;
use crate::runtime::controller::Controller;
use crate::runtime::controller::ControllerError;
use crate::runtime::state_store::InfrastructureTemplate;

// ============================================================================
// SECTION: Requests and Reports
// ============================================================================

/// Default inject budget when a request does not override it.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Request to generate one scenario.
///
/// # Invariants
/// - `max_iterations` must be at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Scenario archetype.
    pub scenario_type: ScenarioType,
    /// Explicit scenario identifier; generated when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<ScenarioId>,
    /// Inject budget for the run.
    pub max_iterations: u32,
    /// Validation mode.
    pub mode: GenerationMode,
    /// Whether decision points are raised during the run.
    pub interactive: bool,
    /// Compliance standards enabled for the run.
    pub compliance_standards: Vec<String>,
    /// Scenario start timestamp supplied by the host.
    pub start_time: Timestamp,
}

impl GenerateRequest {
    /// Creates a request with the default budget, thesis mode, and DORA.
    #[must_use]
    pub fn new(scenario_type: ScenarioType, start_time: Timestamp) -> Self {
        Self {
            scenario_type,
            scenario_id: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            mode: GenerationMode::Thesis,
            interactive: false,
            compliance_standards: vec!["DORA".to_string()],
            start_time,
        }
    }
}

/// Caller-facing report for one run.
///
/// # Invariants
/// - `pending_decision` is set if and only if the run is suspended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario identifier.
    pub scenario_id: ScenarioId,
    /// Accepted injects in timeline order.
    pub injects: Vec<Inject>,
    /// Accumulated run errors.
    pub errors: Vec<String>,
    /// Accumulated run warnings.
    pub warnings: Vec<String>,
    /// Final asset snapshot.
    pub system_state: BTreeMap<EntityId, Entity>,
    /// Node-by-node workflow log.
    pub workflow_logs: Vec<String>,
    /// Recorded human decisions.
    pub user_decisions: Vec<UserDecision>,
    /// Suspended decision point, when the run awaits a choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_decision: Option<PendingDecision>,
    /// Termination reason once the run has ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_condition: Option<EndCondition>,
}

impl RunReport {
    /// Builds a report from the run's workflow state.
    fn from_state(state: &WorkflowState) -> Self {
        Self {
            scenario_id: state.scenario_id().clone(),
            injects: state.scenario.injects.clone(),
            errors: state.errors.clone(),
            warnings: state.warnings.clone(),
            system_state: state.system_state.clone(),
            workflow_logs: state.workflow_logs.clone(),
            user_decisions: state.user_decisions.clone(),
            pending_decision: state.pending_decision.clone(),
            end_condition: state.end_condition,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine-level errors surfaced to callers.
///
/// These cover request validation and registry access only; generation
/// failures degrade into run warnings and errors instead.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request failed validation before the run began.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// No run is registered under the scenario identifier.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    /// Decision routing failed.
    #[error(transparent)]
    Decision(#[from] ControllerError),
    /// Infrastructure seeding failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The run registry is unavailable.
    #[error("run registry unavailable: {0}")]
    Registry(String),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Public generation API over the controller and a run registry.
pub struct Engine<L, G, V, T> {
    /// The state-machine runtime.
    controller: Controller<L, G, V, T>,
    /// Registered runs keyed by scenario id.
    runs: Mutex<BTreeMap<String, WorkflowState>>,
}

impl<L, G, V, T> Engine<L, G, V, T>
where
    L: LanguageModel,
    G: GraphStore,
    V: VectorStore,
    T: TraceSink,
{
    /// Creates an engine over the given controller.
    #[must_use]
    pub const fn new(controller: Controller<L, G, V, T>) -> Self {
        Self {
            controller,
            runs: Mutex::new(BTreeMap::new()),
        }
    }

    /// Seeds the infrastructure graph and returns the entity count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] when seeding fails.
    pub fn seed_infrastructure(
        &self,
        template: &InfrastructureTemplate,
    ) -> Result<usize, EngineError> {
        Ok(self.controller.state_store().seed_infrastructure(template)?)
    }

    /// Generates one scenario, suspending at a decision point if interactive.
    ///
    /// Repeating a request for an existing scenario id returns the recorded
    /// run (runs are idempotent with respect to scenario id).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRequest`] on a zero inject budget and
    /// [`EngineError::Registry`] when the registry is unavailable.
    pub fn generate_scenario(&self, request: &GenerateRequest) -> Result<RunReport, EngineError> {
        if request.max_iterations == 0 {
            return Err(EngineError::InvalidRequest(
                "max_iterations must be at least one".to_string(),
            ));
        }
        let mut runs = self.lock_runs()?;
        let scenario_id = request.scenario_id.clone().unwrap_or_else(|| {
            let sequence = u64::try_from(runs.len()).unwrap_or(u64::MAX).saturating_add(1);
            ScenarioId::from_sequence(sequence)
        });
        if let Some(existing) = runs.get(scenario_id.as_str()) {
            return Ok(RunReport::from_state(existing));
        }

        let mut state = WorkflowState::new(
            scenario_id.clone(),
            request.scenario_type,
            request.max_iterations,
            request.mode,
            request.interactive,
            request.start_time,
        );
        state.compliance_standards = request.compliance_standards.clone();
        self.controller.run_until_decision(&mut state);
        let report = RunReport::from_state(&state);
        runs.insert(scenario_id.as_str().to_string(), state);
        Ok(report)
    }

    /// Resumes a suspended interactive run with the supplied choice.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownScenario`] for unregistered runs and
    /// [`EngineError::Decision`] when the choice cannot be applied.
    pub fn supply_decision(
        &self,
        scenario_id: &ScenarioId,
        choice_id: &ChoiceId,
    ) -> Result<RunReport, EngineError> {
        let mut runs = self.lock_runs()?;
        let state = runs
            .get_mut(scenario_id.as_str())
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))?;
        self.controller.resume_after_decision(state, choice_id)?;
        self.controller.run_until_decision(state);
        Ok(RunReport::from_state(state))
    }

    /// Sets the incident-response feedback consumed by the next generation.
    ///
    /// Orthogonal to decisions: feedback informs the next inject's narrative,
    /// while a decision applies mapped state effects.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownScenario`] for unregistered runs.
    pub fn set_user_feedback(
        &self,
        scenario_id: &ScenarioId,
        feedback: impl Into<String>,
    ) -> Result<(), EngineError> {
        let mut runs = self.lock_runs()?;
        let state = runs
            .get_mut(scenario_id.as_str())
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))?;
        state.user_feedback = Some(feedback.into());
        Ok(())
    }

    /// Lists registered scenario identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Registry`] when the registry is unavailable.
    pub fn list_scenarios(&self) -> Result<Vec<ScenarioId>, EngineError> {
        let runs = self.lock_runs()?;
        Ok(runs.values().map(|state| state.scenario_id().clone()).collect())
    }

    /// Returns the scenario recorded for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownScenario`] for unregistered runs.
    pub fn get_scenario(&self, scenario_id: &ScenarioId) -> Result<Scenario, EngineError> {
        let runs = self.lock_runs()?;
        runs.get(scenario_id.as_str())
            .map(|state| state.scenario.clone())
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))
    }

    /// Returns the workflow logs recorded for an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownScenario`] for unregistered runs.
    pub fn get_scenario_logs(&self, scenario_id: &ScenarioId) -> Result<Vec<String>, EngineError> {
        let runs = self.lock_runs()?;
        runs.get(scenario_id.as_str())
            .map(|state| state.workflow_logs.clone())
            .ok_or_else(|| EngineError::UnknownScenario(scenario_id.to_string()))
    }

    /// Locks the run registry, mapping poisoning to an engine error.
    fn lock_runs(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, WorkflowState>>, EngineError> {
        self.runs.lock().map_err(|_| EngineError::Registry("run registry mutex poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: A/B Measurement
// ============================================================================

/// Counts hallucinations prevented by the symbolic layer for an A/B pair.
///
/// A hallucination is a distinct affected-asset id that does not exist in the
/// known asset set. The result is floored at zero.
#[must_use]
pub fn hallucinations_prevented(
    legacy_injects: &[Inject],
    thesis_injects: &[Inject],
    known_assets: &BTreeSet<EntityId>,
) -> usize {
    let legacy = hallucinated_assets(legacy_injects, known_assets).len();
    let thesis = hallucinated_assets(thesis_injects, known_assets).len();
    legacy.saturating_sub(thesis)
}

/// Returns the distinct unknown asset ids referenced by a set of injects.
#[must_use]
pub fn hallucinated_assets(
    injects: &[Inject],
    known_assets: &BTreeSet<EntityId>,
) -> BTreeSet<EntityId> {
    let mut unknown = BTreeSet::new();
    for inject in injects {
        for asset in &inject.technical_metadata.affected_assets {
            if !known_assets.contains(asset) {
                unknown.insert(asset.clone());
            }
        }
    }
    unknown
}

// crates/msel-forge-core/src/core/state.rs
// ============================================================================
// Module: MSEL Forge Workflow State
// Description: Controller working memory, decisions, and run bookkeeping.
// Purpose: Capture deterministic run evolution for replay and verification.
// Dependencies: crate::core::{entity, identifiers, inject, phase, time, ttp, validation}, serde
// ============================================================================

//! ## Overview
//! The workflow state is the single mutable record a generation run owns.
//! Nodes receive it by reference and mutate it explicitly; there is no hidden
//! module-level state. Refine counters live in the `metadata` sub-record
//! keyed by inject id. Error and warning lists accumulate; mid-run failures
//! are recorded here rather than raised to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::entity::Entity;
use crate::core::entity::EntityStatus;
use crate::core::identifiers::ChoiceId;
use crate::core::identifiers::EntityId;
use crate::core::identifiers::InjectId;
use crate::core::identifiers::ScenarioId;
use crate::core::inject::Inject;
use crate::core::inject::Scenario;
use crate::core::phase::CrisisPhase;
use crate::core::phase::ScenarioType;
use crate::core::time::Timestamp;
use crate::core::ttp::Ttp;
use crate::core::validation::ValidationResult;

// ============================================================================
// SECTION: Generation Mode
// ============================================================================

/// Validation mode for a generation run.
///
/// # Invariants
/// - Variants are stable for serialization and A/B evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// A/B measurement mode: the critic accepts every draft unchecked.
    Legacy,
    /// Full symbolic validation (default).
    #[default]
    Thesis,
}

// ============================================================================
// SECTION: End Conditions
// ============================================================================

/// Reason a run terminated.
///
/// # Invariants
/// - Variants are stable for serialization and run reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    /// The configured inject budget was reached.
    MaxInjects,
    /// The iteration fallback cap was reached (refine loops).
    IterationCap,
    /// More than the tolerated number of errors accumulated.
    ErrorBudget,
    /// Recovery phase reached with a sufficient timeline.
    RecoveryComplete,
    /// The workflow log safety cap was reached.
    LogSafetyCap,
}

impl fmt::Display for EndCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MaxInjects => "max_injects",
            Self::IterationCap => "iteration_cap",
            Self::ErrorBudget => "error_budget",
            Self::RecoveryComplete => "recovery_complete",
            Self::LogSafetyCap => "log_safety_cap",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Manager Plan
// ============================================================================

/// Structured storyline plan produced by the manager agent.
///
/// # Invariants
/// - `target_phase` must be a legal transition target when the plan is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerPlan {
    /// Narrative goal for the next inject.
    pub next_goal: String,
    /// Phase the storyline should move toward.
    pub target_phase: CrisisPhase,
    /// Rationale recorded for the trace.
    pub rationale: String,
    /// Assets the storyline suggests involving.
    pub suggested_assets: Vec<EntityId>,
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Effect mapped to a decision option.
///
/// # Invariants
/// - Variants are stable for serialization and decision catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionImpact {
    /// Set an asset to a specific status.
    SetStatus {
        /// Asset to update.
        asset: EntityId,
        /// Status to write.
        status: EntityStatus,
    },
    /// Mark an asset as hardened against direct targeting.
    Protect {
        /// Asset to protect.
        asset: EntityId,
    },
    /// Bias subsequent generation toward de-escalation.
    DampenSeverity,
    /// Bias subsequent generation toward escalation.
    AmplifySeverity,
}

/// One branching option presented at a decision point.
///
/// # Invariants
/// - `choice_id` is unique within its decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Option identifier.
    pub choice_id: ChoiceId,
    /// Short operator-facing label.
    pub label: String,
    /// Longer description of the simulated response action.
    pub description: String,
    /// Effects applied to system state when chosen.
    pub impacts: Vec<DecisionImpact>,
}

/// A suspended decision point awaiting an external choice.
///
/// # Invariants
/// - The run does not advance until a listed choice is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    /// Phase the decision was raised in.
    pub phase: CrisisPhase,
    /// Inject position the decision follows.
    pub after_inject: usize,
    /// Available branching options.
    pub options: Vec<DecisionOption>,
}

/// One recorded human decision.
///
/// # Invariants
/// - Records are append-only within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDecision {
    /// Chosen option identifier.
    pub choice_id: ChoiceId,
    /// Phase the decision was taken in.
    pub phase: CrisisPhase,
    /// Host-supplied decision timestamp.
    pub decided_at: Timestamp,
    /// Measured impact summary (entities changed, biases applied).
    pub impact: String,
}

// ============================================================================
// SECTION: Run Metadata
// ============================================================================

/// Metadata sub-record holding per-inject refine counters and extensions.
///
/// # Invariants
/// - `refine_counts` is keyed by inject id and never exceeds the refine budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Refine attempts per inject id.
    #[serde(default)]
    pub refine_counts: BTreeMap<InjectId, u8>,
    /// Assets hardened by decisions; the generator must not target them.
    #[serde(default)]
    pub protected_assets: BTreeSet<EntityId>,
    /// Severity bias accumulated from decisions (negative dampens).
    #[serde(default)]
    pub severity_bias: i8,
    /// Tactics of techniques attached to accepted injects, in order.
    #[serde(default)]
    pub accepted_tactics: Vec<String>,
    /// Inject positions at which a decision point was already raised.
    #[serde(default)]
    pub decision_positions: BTreeSet<usize>,
    /// Phase labels for which a decision point was already raised.
    #[serde(default)]
    pub decision_phases: BTreeSet<String>,
    /// Free-form host extensions.
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// SECTION: Workflow State
// ============================================================================

/// Controller working memory for one generation run.
///
/// # Invariants
/// - Mutated by exactly one node at a time (single-threaded cooperative run).
/// - `scenario.injects` is append-only; appends happen only in the state
///   update node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Scenario under construction (owns accepted injects and current phase).
    pub scenario: Scenario,
    /// Snapshot of the infrastructure graph keyed by asset id.
    pub system_state: BTreeMap<EntityId, Entity>,
    /// Loop iterations executed so far.
    pub iteration: u32,
    /// Inject budget for the run.
    pub max_iterations: u32,
    /// Latest storyline plan, if any.
    pub manager_plan: Option<ManagerPlan>,
    /// Technique selected for the current generation attempt.
    pub selected_action: Option<Ttp>,
    /// Draft inject awaiting validation, if any.
    pub draft_inject: Option<Inject>,
    /// Verdict for the latest draft, if any.
    pub validation_result: Option<ValidationResult>,
    /// Candidate techniques for the current phase.
    pub available_ttps: Vec<Ttp>,
    /// Short summaries of accepted injects for prompting.
    pub historical_context: Vec<String>,
    /// Accumulated run errors (never raised to the caller mid-run).
    pub errors: Vec<String>,
    /// Accumulated run warnings.
    pub warnings: Vec<String>,
    /// Node-by-node workflow log.
    pub workflow_logs: Vec<String>,
    /// Recorded human decisions.
    pub user_decisions: Vec<UserDecision>,
    /// Suspended decision point, if the run is waiting on a choice.
    pub pending_decision: Option<PendingDecision>,
    /// Termination reason once the run has ended.
    pub end_condition: Option<EndCondition>,
    /// Whether decision points are raised during this run.
    pub interactive_mode: bool,
    /// Validation mode.
    pub mode: GenerationMode,
    /// Compliance standards enabled for this run (framework names).
    pub compliance_standards: Vec<String>,
    /// Externally supplied feedback consumed by exactly one generation.
    pub user_feedback: Option<String>,
    /// Overall quality scores of validation attempts, in order.
    pub quality_scores: Vec<f64>,
    /// Metadata sub-record (refine counters, protections, biases).
    pub metadata: RunMetadata,
}

impl WorkflowState {
    /// Creates the initial state for a run.
    #[must_use]
    pub fn new(
        scenario_id: ScenarioId,
        scenario_type: ScenarioType,
        max_iterations: u32,
        mode: GenerationMode,
        interactive_mode: bool,
        start_time: Timestamp,
    ) -> Self {
        Self {
            scenario: Scenario::new(scenario_id, scenario_type, start_time),
            system_state: BTreeMap::new(),
            iteration: 0,
            max_iterations,
            manager_plan: None,
            selected_action: None,
            draft_inject: None,
            validation_result: None,
            available_ttps: Vec::new(),
            historical_context: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            workflow_logs: Vec::new(),
            user_decisions: Vec::new(),
            pending_decision: None,
            end_condition: None,
            interactive_mode,
            mode,
            compliance_standards: Vec::new(),
            user_feedback: None,
            quality_scores: Vec::new(),
            metadata: RunMetadata::default(),
        }
    }

    /// Returns the scenario identifier.
    #[must_use]
    pub const fn scenario_id(&self) -> &ScenarioId {
        &self.scenario.scenario_id
    }

    /// Returns the current crisis phase.
    #[must_use]
    pub const fn current_phase(&self) -> CrisisPhase {
        self.scenario.current_phase
    }

    /// Returns the refine count recorded for an inject id.
    #[must_use]
    pub fn refine_count(&self, inject_id: &InjectId) -> u8 {
        self.metadata.refine_counts.get(inject_id).copied().unwrap_or(0)
    }

    /// Increments and returns the refine count for an inject id.
    pub fn bump_refine_count(&mut self, inject_id: &InjectId) -> u8 {
        let counter = self.metadata.refine_counts.entry(inject_id.clone()).or_insert(0);
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Appends one line to the workflow log.
    pub fn log(&mut self, message: impl Into<String>) {
        self.workflow_logs.push(message.into());
    }
}

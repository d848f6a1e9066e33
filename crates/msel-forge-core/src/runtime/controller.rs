// crates/msel-forge-core/src/runtime/controller.rs
// ============================================================================
// Module: MSEL Forge Controller
// Description: Explicit state machine sequencing agents, critic, and updates.
// Purpose: Drive generation with refine loops, decision points, and tracing.
// Dependencies: crate::{agents, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The controller is the single canonical execution path for scenario
//! generation. Nodes execute one at a time over the run's workflow state;
//! conditional transitions come from the pure functions [`should_refine`],
//! [`should_continue`], and [`should_ask_decision`], which makes the loop
//! testable with synthetic agents. Suspension at a decision point splits the
//! run into [`Controller::run_until_decision`] and
//! [`Controller::resume_after_decision`]. Mid-run failures degrade into the
//! state's error and warning lists; they never abort the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::json;
use thiserror::Error;

use crate::agents::CriticAgent;
use crate::agents::CriticInput;
use crate::agents::GeneratorAgent;
use crate::agents::GeneratorPromptInput;
use crate::agents::ManagerAgent;
use crate::agents::summarize_inject;
use crate::core::ChoiceId;
use crate::core::CrisisPhase;
use crate::core::DecisionImpact;
use crate::core::EndCondition;
use crate::core::InjectId;
use crate::core::TimeOffset;
use crate::core::Timestamp;
use crate::core::TraceError;
use crate::core::TraceEventKind;
use crate::core::TraceRecord;
use crate::core::TraceSink;
use crate::core::UserDecision;
use crate::core::ValidationIssue;
use crate::core::ValidationIssueKind;
use crate::core::WorkflowState;
use crate::interfaces::GraphStore;
use crate::interfaces::LanguageModel;
use crate::interfaces::VectorStore;
use crate::runtime::decision::build_decision_point;
use crate::runtime::intel::IntelProvider;
use crate::runtime::state_store::StateStore;
use crate::runtime::state_update::StateUpdater;

// ============================================================================
// SECTION: Nodes and Edges
// ============================================================================

/// Workflow node identifiers.
///
/// # Invariants
/// - Variants are stable for logging and dispatch-table tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    /// Snapshot state and refresh history.
    StateCheck,
    /// Produce the storyline plan.
    Manager,
    /// Retrieve candidate techniques.
    Intel,
    /// Select one technique for this attempt.
    ActionSelection,
    /// Draft one inject.
    Generator,
    /// Validate the draft.
    Critic,
    /// Apply the accepted inject to system state.
    StateUpdate,
    /// Raise a decision point and suspend.
    DecisionPoint,
}

/// Outcome of dispatching one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    /// Continue with the given node.
    Next(NodeId),
    /// Suspend awaiting an external decision.
    Suspend,
    /// The run has ended.
    End,
}

/// Conditional edge after the critic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineDecision {
    /// Send the draft back to the generator with feedback.
    Refine,
    /// Proceed to the state update (accept, possibly with warnings).
    Update,
}

/// Conditional edge after the state update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostUpdate {
    /// Loop back to the state check.
    Continue,
    /// Raise a decision point.
    Decision,
    /// End the run for the given reason.
    End(EndCondition),
}

// ============================================================================
// SECTION: Pure Transition Functions
// ============================================================================

/// Per-inject refine budget.
pub const REFINE_BUDGET: u8 = 2;

/// Error budget before a run is cut short.
const ERROR_BUDGET: usize = 20;

/// Decides refine-vs-update after a critic verdict.
#[must_use]
pub fn should_refine(state: &WorkflowState) -> RefineDecision {
    let Some(result) = &state.validation_result else {
        return RefineDecision::Update;
    };
    if result.is_valid {
        return RefineDecision::Update;
    }
    let Some(draft) = &state.draft_inject else {
        return RefineDecision::Update;
    };
    if state.refine_count(&draft.inject_id) < REFINE_BUDGET {
        RefineDecision::Refine
    } else {
        RefineDecision::Update
    }
}

/// Non-interactive termination check, evaluated in order.
#[must_use]
pub fn should_continue(state: &WorkflowState) -> Option<EndCondition> {
    let inject_count = state.scenario.injects.len();
    let max = usize::try_from(state.max_iterations).unwrap_or(usize::MAX);
    if inject_count >= max {
        return Some(EndCondition::MaxInjects);
    }
    if usize::try_from(state.iteration).unwrap_or(usize::MAX) >= max.saturating_mul(2) {
        return Some(EndCondition::IterationCap);
    }
    if state.errors.len() > ERROR_BUDGET {
        return Some(EndCondition::ErrorBudget);
    }
    if state.current_phase() == CrisisPhase::Recovery
        && inject_count >= 3.max(max.saturating_mul(4) / 5)
    {
        return Some(EndCondition::RecoveryComplete);
    }
    if state.workflow_logs.len() > max.saturating_mul(15) {
        return Some(EndCondition::LogSafetyCap);
    }
    None
}

/// Interactive-mode check: end, raise a decision, or continue.
#[must_use]
pub fn should_ask_decision(state: &WorkflowState) -> PostUpdate {
    if let Some(end) = should_continue(state) {
        return PostUpdate::End(end);
    }
    let position = state.scenario.injects.len();
    let even_checkpoint = (2..=20).contains(&position)
        && position % 2 == 0
        && !state.metadata.decision_positions.contains(&position);
    let phase = state.current_phase();
    let phase_checkpoint = matches!(
        phase,
        CrisisPhase::EscalationCrisis | CrisisPhase::Containment
    ) && !state.metadata.decision_phases.contains(phase.label());
    if even_checkpoint || phase_checkpoint {
        PostUpdate::Decision
    } else {
        PostUpdate::Continue
    }
}

// ============================================================================
// SECTION: Controller Errors
// ============================================================================

/// Errors surfaced by the controller's public resume surface.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The run has no pending decision to resume.
    #[error("no pending decision for scenario: {0}")]
    NoPendingDecision(String),
    /// The supplied choice is not among the pending options.
    #[error("unknown choice: {0}")]
    UnknownChoice(String),
}

// ============================================================================
// SECTION: Controller Configuration
// ============================================================================

/// Tunable controller parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Candidate techniques requested per phase.
    pub ttp_candidates: usize,
    /// Accepted-inject summaries kept for prompting.
    pub history_window: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ttp_candidates: 5,
            history_window: 5,
        }
    }
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// The scenario-generation state machine runtime.
pub struct Controller<L, G, V, T> {
    /// Language model backend shared by the agents.
    model: L,
    /// Authoritative asset repository.
    state_store: StateStore<G>,
    /// Technique retrieval.
    intel: IntelProvider<V>,
    /// Forensic trace sink.
    trace: T,
    /// Symbolic validator.
    critic: CriticAgent,
    /// Controller configuration.
    config: ControllerConfig,
}

impl<L, G, V, T> Controller<L, G, V, T>
where
    L: LanguageModel,
    G: GraphStore,
    V: VectorStore,
    T: TraceSink,
{
    /// Creates a controller over the given components.
    pub const fn new(
        model: L,
        state_store: StateStore<G>,
        intel: IntelProvider<V>,
        trace: T,
        critic: CriticAgent,
        config: ControllerConfig,
    ) -> Self {
        Self {
            model,
            state_store,
            intel,
            trace,
            critic,
            config,
        }
    }

    /// Returns the state store for seeding and snapshot reads.
    pub const fn state_store(&self) -> &StateStore<G> {
        &self.state_store
    }

    /// Drives the run until it suspends at a decision point or ends.
    pub fn run_until_decision(&self, state: &mut WorkflowState) {
        if state.end_condition.is_some() || state.pending_decision.is_some() {
            return;
        }
        let mut node = NodeId::StateCheck;
        loop {
            match self.dispatch(node, state) {
                NodeOutcome::Next(next) => node = next,
                NodeOutcome::Suspend | NodeOutcome::End => return,
            }
        }
    }

    /// Applies a supplied choice and clears the pending decision.
    ///
    /// The caller resumes the run with [`Controller::run_until_decision`].
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when no decision is pending or the choice
    /// is not among the pending options.
    pub fn resume_after_decision(
        &self,
        state: &mut WorkflowState,
        choice_id: &ChoiceId,
    ) -> Result<(), ControllerError> {
        let Some(pending) = state.pending_decision.clone() else {
            return Err(ControllerError::NoPendingDecision(state.scenario_id().to_string()));
        };
        let Some(option) = pending.options.iter().find(|option| option.choice_id == *choice_id)
        else {
            return Err(ControllerError::UnknownChoice(choice_id.to_string()));
        };

        let at = run_tick(state);
        let mut status_writes = 0usize;
        let mut protections = 0usize;
        let mut bias_delta = 0i8;
        for impact in &option.impacts {
            match impact {
                DecisionImpact::SetStatus {
                    asset,
                    status,
                } => {
                    match self.state_store.update_entity_status(asset, *status, None, at) {
                        Ok(()) => {
                            if let Some(entity) = state.system_state.get_mut(asset) {
                                entity.status = *status;
                                entity.last_updated = at;
                            }
                            status_writes += 1;
                        }
                        Err(err) => {
                            state.errors.push(format!("decision write failed for {asset}: {err}"));
                        }
                    }
                }
                DecisionImpact::Protect {
                    asset,
                } => {
                    state.metadata.protected_assets.insert(asset.clone());
                    protections += 1;
                }
                DecisionImpact::DampenSeverity => bias_delta = bias_delta.saturating_sub(1),
                DecisionImpact::AmplifySeverity => bias_delta = bias_delta.saturating_add(1),
            }
        }
        state.metadata.severity_bias = state.metadata.severity_bias.saturating_add(bias_delta);

        let impact_summary = format!(
            "{status_writes} status writes, {protections} protections, severity bias {bias_delta:+}"
        );
        state.user_decisions.push(UserDecision {
            choice_id: choice_id.clone(),
            phase: pending.phase,
            decided_at: at,
            impact: impact_summary.clone(),
        });
        self.append_trace(
            state,
            TraceEventKind::Decision,
            None,
            format!("decision {choice_id}: {}", option.label),
            json!({
                "choice_id": choice_id,
                "phase": pending.phase,
                "impact": impact_summary,
            }),
        );
        state.log(format!("decision applied: {choice_id} ({impact_summary})"));
        state.pending_decision = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Node dispatch
    // ------------------------------------------------------------------

    /// Dispatch table: executes one node and returns the next edge.
    fn dispatch(&self, node: NodeId, state: &mut WorkflowState) -> NodeOutcome {
        match node {
            NodeId::StateCheck => self.node_state_check(state),
            NodeId::Manager => self.node_manager(state),
            NodeId::Intel => self.node_intel(state),
            NodeId::ActionSelection => Self::node_action_selection(state),
            NodeId::Generator => self.node_generator(state),
            NodeId::Critic => self.node_critic(state),
            NodeId::StateUpdate => self.node_state_update(state),
            NodeId::DecisionPoint => Self::node_decision_point(state),
        }
    }

    /// Snapshots state and refreshes history (`state_check`).
    fn node_state_check(&self, state: &mut WorkflowState) -> NodeOutcome {
        state.iteration = state.iteration.saturating_add(1);
        match self.state_store.get_current_state(None) {
            Ok(snapshot) => state.system_state = snapshot,
            Err(err) => {
                state.errors.push(format!("state snapshot failed: {err}"));
            }
        }
        let window = self.config.history_window;
        let summaries: Vec<String> = state
            .scenario
            .injects
            .iter()
            .rev()
            .take(window)
            .rev()
            .map(summarize_inject)
            .collect();
        state.historical_context = summaries;
        state.log(format!(
            "state_check: iteration {} with {} assets",
            state.iteration,
            state.system_state.len()
        ));
        NodeOutcome::Next(NodeId::Manager)
    }

    /// Produces the storyline plan (`manager`).
    fn node_manager(&self, state: &mut WorkflowState) -> NodeOutcome {
        let outcome = ManagerAgent::plan(
            &self.model,
            state.scenario.scenario_type,
            state.current_phase(),
            &state.system_state,
            &state.historical_context,
        );
        state.warnings.extend(outcome.warnings);
        state.log(format!(
            "manager: goal '{}' toward {}",
            outcome.plan.next_goal, outcome.plan.target_phase
        ));
        state.manager_plan = Some(outcome.plan);
        NodeOutcome::Next(NodeId::Intel)
    }

    /// Retrieves candidate techniques (`intel`).
    fn node_intel(&self, state: &mut WorkflowState) -> NodeOutcome {
        let selection = self.intel.get_ttps(
            state.scenario.scenario_type,
            state.current_phase(),
            self.config.ttp_candidates,
        );
        if selection.used_fallback {
            state.warnings.push("intel served from curated fallback".to_string());
        }
        state.log(format!("intel: {} candidate techniques", selection.ttps.len()));
        state.available_ttps = selection.ttps;
        NodeOutcome::Next(NodeId::ActionSelection)
    }

    /// Picks one technique round-robin, biased toward the phase
    /// (`action_selection`).
    fn node_action_selection(state: &mut WorkflowState) -> NodeOutcome {
        if state.available_ttps.is_empty() {
            state.warnings.push("no techniques available for selection".to_string());
            state.selected_action = None;
            return NodeOutcome::Next(NodeId::Generator);
        }
        let preferred = preferred_tactics(state.current_phase());
        let pool: Vec<usize> = state
            .available_ttps
            .iter()
            .enumerate()
            .filter(|(_, ttp)| preferred.contains(&ttp.tactic.as_str()))
            .map(|(index, _)| index)
            .collect();
        let candidates = if pool.is_empty() {
            (0..state.available_ttps.len()).collect::<Vec<usize>>()
        } else {
            pool
        };
        let slot = state.scenario.injects.len() % candidates.len();
        let chosen = state.available_ttps[candidates[slot]].clone();
        state.log(format!("action_selection: {} {}", chosen.id, chosen.name));
        state.selected_action = Some(chosen);
        NodeOutcome::Next(NodeId::Generator)
    }

    /// Drafts one inject (`generator`).
    fn node_generator(&self, state: &mut WorkflowState) -> NodeOutcome {
        let ordinal = u64::try_from(state.scenario.injects.len()).unwrap_or(u64::MAX);
        let expected_id = InjectId::from_ordinal(ordinal.saturating_add(1));
        let min_offset = state.scenario.last_offset().unwrap_or(TimeOffset::from_seconds(0));
        let validation_feedback = state.validation_result.as_ref().filter(|r| !r.is_valid).map(
            |result| {
                result
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()
                    .join("; ")
            },
        );
        // Consumed by exactly one generation; callers may set it again.
        let user_feedback = state.user_feedback.take();
        let input = GeneratorPromptInput {
            scenario_type: state.scenario.scenario_type,
            current_phase: state.current_phase(),
            inject_id: &expected_id,
            min_offset,
            manager_plan: state.manager_plan.as_ref(),
            selected_ttp: state.selected_action.as_ref(),
            snapshot: &state.system_state,
            historical_context: &state.historical_context,
            validation_feedback: validation_feedback.as_deref(),
            user_feedback: user_feedback.as_deref(),
            protected_assets: &state.metadata.protected_assets,
            severity_bias: state.metadata.severity_bias,
        };
        let outcome = GeneratorAgent::draft(&self.model, &input, run_tick(state));
        state.warnings.extend(outcome.warnings.clone());
        self.append_trace(
            state,
            TraceEventKind::Draft,
            Some(outcome.inject.inject_id.clone()),
            format!("draft {} at {}", outcome.inject.inject_id, outcome.inject.time_offset),
            json!({
                "draft": outcome.inject,
                "raw_response": outcome.raw_response,
                "warnings": outcome.warnings,
            }),
        );
        state.log(format!("generator: drafted {}", outcome.inject.inject_id));
        state.draft_inject = Some(outcome.inject);
        NodeOutcome::Next(NodeId::Critic)
    }

    /// Validates the draft (`critic`) and takes the refine/update edge.
    fn node_critic(&self, state: &mut WorkflowState) -> NodeOutcome {
        let Some(draft) = state.draft_inject.clone() else {
            state.errors.push("critic reached with no draft inject".to_string());
            return NodeOutcome::Next(NodeId::StateUpdate);
        };
        let accepted_ids: Vec<InjectId> =
            state.scenario.injects.iter().map(|inject| inject.inject_id.clone()).collect();
        let input = CriticInput {
            draft: &draft,
            accepted_ids: &accepted_ids,
            last_offset: state.scenario.last_offset(),
            current_phase: state.current_phase(),
            snapshot: &state.system_state,
            historical_context: &state.historical_context,
            draft_tactic: state.selected_action.as_ref().map(|ttp| ttp.tactic.as_str()),
            prior_tactics: &state.metadata.accepted_tactics,
            mode: state.mode,
            standards: &state.compliance_standards,
            prior_scores: &state.quality_scores,
        };
        let outcome = self.critic.validate(&self.model, &input);
        if let Some(metrics) = &outcome.result.metrics {
            state.quality_scores.push(metrics.overall_quality_score);
        }
        let details = serde_json::to_value(&outcome.audit).unwrap_or_else(|_| json!({}));
        self.append_trace(
            state,
            TraceEventKind::Critic,
            Some(draft.inject_id.clone()),
            format!("critic {}: {}", outcome.audit.decision, draft.inject_id),
            details,
        );
        state.log(format!(
            "critic: {} with {} errors, {} warnings",
            outcome.audit.decision,
            outcome.result.errors.len(),
            outcome.result.warnings.len()
        ));
        state.validation_result = Some(outcome.result);

        match should_refine(state) {
            RefineDecision::Refine => {
                let attempt = state.bump_refine_count(&draft.inject_id);
                self.append_trace(
                    state,
                    TraceEventKind::Refined,
                    Some(draft.inject_id.clone()),
                    format!("refine attempt {attempt} for {}", draft.inject_id),
                    json!({ "attempt": attempt }),
                );
                state.log(format!("refine: attempt {attempt} for {}", draft.inject_id));
                NodeOutcome::Next(NodeId::Generator)
            }
            RefineDecision::Update => NodeOutcome::Next(NodeId::StateUpdate),
        }
    }

    /// Applies the accepted inject to system state (`state_update`).
    fn node_state_update(&self, state: &mut WorkflowState) -> NodeOutcome {
        let Some(inject) = state.draft_inject.take() else {
            state.errors.push("state update reached with no draft inject".to_string());
            return self.post_update_edge(state);
        };

        // Refine budget exhaustion: accept the final attempt with a warning.
        if let Some(result) = &mut state.validation_result
            && !result.is_valid
        {
            let warning = ValidationIssue::new(
                ValidationIssueKind::Validator,
                format!("accepted after {REFINE_BUDGET} refine attempts"),
            );
            result.warnings.push(warning.clone());
            state.warnings.push(warning.to_string());
        }
        if let Some(result) = &state.validation_result {
            for warning in &result.warnings {
                let rendered = warning.to_string();
                if !state.warnings.contains(&rendered) {
                    state.warnings.push(rendered);
                }
            }
        }

        let at = run_tick(state);
        let outcome = StateUpdater::apply(&self.state_store, &mut state.system_state, &inject, at);
        state.warnings.extend(outcome.warnings.clone());

        if let Some(ttp) = &state.selected_action
            && inject.technical_metadata.mitre_id.as_ref() == Some(&ttp.id)
        {
            state.metadata.accepted_tactics.push(ttp.tactic.clone());
        }
        state.scenario.current_phase = inject.phase;
        state.historical_context.push(summarize_inject(&inject));
        self.append_trace(
            state,
            TraceEventKind::StateUpdate,
            Some(inject.inject_id.clone()),
            format!(
                "accepted {} ({} primary, {} cascade updates)",
                inject.inject_id,
                outcome.primary_updates.len(),
                outcome.cascade_updates.len()
            ),
            json!({
                "inject": inject,
                "primary_updates": outcome.primary_updates,
                "cascade_updates": outcome.cascade_updates,
            }),
        );
        state.log(format!("state_update: accepted {}", inject.inject_id));
        state.scenario.injects.push(inject);
        state.validation_result = None;
        self.post_update_edge(state)
    }

    /// Evaluates the post-update conditional edge.
    fn post_update_edge(&self, state: &mut WorkflowState) -> NodeOutcome {
        let next = if state.interactive_mode {
            should_ask_decision(state)
        } else {
            should_continue(state).map_or(PostUpdate::Continue, PostUpdate::End)
        };
        match next {
            PostUpdate::Continue => NodeOutcome::Next(NodeId::StateCheck),
            PostUpdate::Decision => NodeOutcome::Next(NodeId::DecisionPoint),
            PostUpdate::End(condition) => {
                state.end_condition = Some(condition);
                state.log(format!("end: {condition}"));
                NodeOutcome::End
            }
        }
    }

    /// Raises a decision point and suspends (`decision_point`).
    fn node_decision_point(state: &mut WorkflowState) -> NodeOutcome {
        let position = state.scenario.injects.len();
        let phase = state.current_phase();
        state.metadata.decision_positions.insert(position);
        state.metadata.decision_phases.insert(phase.label().to_string());
        let pending = build_decision_point(
            state.scenario.scenario_type,
            phase,
            position,
            &state.system_state,
        );
        state.log(format!(
            "decision_point: {} options after inject {position}",
            pending.options.len()
        ));
        state.pending_decision = Some(pending);
        NodeOutcome::Suspend
    }

    // ------------------------------------------------------------------
    // Trace helper
    // ------------------------------------------------------------------

    /// Appends one trace record, degrading sink failures into warnings.
    fn append_trace(
        &self,
        state: &mut WorkflowState,
        event_type: TraceEventKind,
        inject_id: Option<InjectId>,
        message: String,
        details: serde_json::Value,
    ) {
        let record = TraceRecord {
            timestamp: run_tick(state),
            event_type,
            inject_id,
            scenario_id: state.scenario_id().clone(),
            message,
            details,
        };
        if let Err(err) = self.trace.append(&record) {
            push_trace_warning(state, &err);
        }
    }
}

/// Records a trace-sink failure without aborting the run.
fn push_trace_warning(state: &mut WorkflowState, err: &TraceError) {
    state.warnings.push(format!("trace append failed: {err}"));
}

/// Current run tick: one tick per workflow-log line already written.
fn run_tick(state: &WorkflowState) -> Timestamp {
    let tick = u64::try_from(state.workflow_logs.len()).unwrap_or(u64::MAX);
    Timestamp::Tick(tick)
}

/// Tactics preferred when selecting a technique for a phase.
const fn preferred_tactics(phase: CrisisPhase) -> &'static [&'static str] {
    match phase {
        CrisisPhase::NormalOperation => &["reconnaissance"],
        CrisisPhase::SuspiciousActivity => &["initial-access", "reconnaissance"],
        CrisisPhase::InitialIncident => &["execution", "persistence", "initial-access"],
        CrisisPhase::EscalationCrisis => &["lateral-movement", "exfiltration", "impact"],
        CrisisPhase::Containment => &["defense-evasion", "impact", "command-and-control"],
        CrisisPhase::Recovery => &["persistence"],
    }
}

// crates/msel-forge-core/src/agents/prompts.rs
// ============================================================================
// Module: MSEL Forge Agent Prompts
// Description: Prompt assembly for the manager, generator, and critic agents.
// Purpose: Build deterministic prompts that enumerate state and constraints.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Prompts are assembled with plain string building and always end with the
//! JSON-only instruction. The generator prompt enumerates the currently valid
//! asset ids and forbids inventing new ones; the critic prompt repeats the
//! same enumeration plus the rule checklist so its verdict is reproducible
//! from the forensic record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::core::CrisisPhase;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::Inject;
use crate::core::InjectId;
use crate::core::ManagerPlan;
use crate::core::ScenarioType;
use crate::core::TimeOffset;
use crate::core::Ttp;

// ============================================================================
// SECTION: Shared Fragments
// ============================================================================

/// Output instruction appended to every agent prompt.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Respond with a single JSON object only. No prose, no code fences, no commentary.";

/// Renders the asset inventory block shared by generator and critic prompts.
fn asset_inventory(snapshot: &BTreeMap<EntityId, Entity>) -> String {
    let mut block = String::from("Valid asset ids (the ONLY ids that exist):\n");
    for entity in snapshot.values() {
        let _ = writeln!(
            block,
            "- {} ({}, status: {})",
            entity.id,
            entity.name,
            entity.status
        );
    }
    block.push_str("Never reference or invent any asset id not listed above.\n");
    block
}

/// Renders prior inject summaries for context.
fn history_block(historical_context: &[String]) -> String {
    if historical_context.is_empty() {
        return "No injects have been accepted yet.\n".to_string();
    }
    let mut block = String::from("Accepted injects so far:\n");
    for summary in historical_context {
        let _ = writeln!(block, "- {summary}");
    }
    block
}

/// Renders a one-line summary of an accepted inject.
#[must_use]
pub fn summarize_inject(inject: &Inject) -> String {
    format!(
        "{} at {} [{}] via {}: {}",
        inject.inject_id,
        inject.time_offset,
        inject.phase,
        inject.modality,
        inject.content
    )
}

// ============================================================================
// SECTION: Manager Prompt
// ============================================================================

/// Builds the manager agent's storyline-planning prompt.
#[must_use]
pub fn manager_prompt(
    scenario_type: ScenarioType,
    current_phase: CrisisPhase,
    snapshot: &BTreeMap<EntityId, Entity>,
    historical_context: &[String],
) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are the exercise director for a financial-sector crisis simulation of {}.",
        scenario_type.narrative()
    );
    let _ = writeln!(prompt, "Current crisis phase: {current_phase}.");
    let successors = current_phase
        .successors()
        .iter()
        .map(|phase| phase.label())
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        prompt,
        "Legal next phases: {successors} (staying in {current_phase} is also allowed)."
    );
    prompt.push_str(&history_block(historical_context));
    prompt.push_str(&asset_inventory(snapshot));
    prompt.push_str(
        "Plan the next storyline beat. Return JSON with fields: \
         next_goal (string), target_phase (one of the phase labels), \
         rationale (string), suggested_assets (array of asset ids).\n",
    );
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}

// ============================================================================
// SECTION: Generator Prompt
// ============================================================================

/// Inputs for assembling the generator prompt.
///
/// # Invariants
/// - `min_offset` is the last accepted inject's offset (or zero).
#[derive(Debug)]
pub struct GeneratorPromptInput<'a> {
    /// Scenario archetype.
    pub scenario_type: ScenarioType,
    /// Phase the draft must stay in or legally move to.
    pub current_phase: CrisisPhase,
    /// Identifier the draft must carry.
    pub inject_id: &'a InjectId,
    /// Lower bound for the draft's time offset.
    pub min_offset: TimeOffset,
    /// Latest storyline plan, if any.
    pub manager_plan: Option<&'a ManagerPlan>,
    /// Technique selected for this attempt.
    pub selected_ttp: Option<&'a Ttp>,
    /// Current asset snapshot.
    pub snapshot: &'a BTreeMap<EntityId, Entity>,
    /// Summaries of accepted injects.
    pub historical_context: &'a [String],
    /// Critic feedback from the rejected previous attempt, if any.
    pub validation_feedback: Option<&'a str>,
    /// Externally supplied incident-response feedback, if any.
    pub user_feedback: Option<&'a str>,
    /// Assets hardened by decisions; not valid attack targets.
    pub protected_assets: &'a BTreeSet<EntityId>,
    /// Accumulated severity bias from decisions (negative dampens).
    pub severity_bias: i8,
}

/// Builds the generator agent's draft-inject prompt.
#[must_use]
pub fn generator_prompt(input: &GeneratorPromptInput<'_>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are scripting one inject for a financial-sector crisis exercise simulating {}.",
        input.scenario_type.narrative()
    );
    prompt.push_str(&history_block(input.historical_context));
    prompt.push_str(&asset_inventory(input.snapshot));

    if let Some(plan) = input.manager_plan {
        let _ = writeln!(
            prompt,
            "Storyline goal: {} (target phase {}). Rationale: {}",
            plan.next_goal,
            plan.target_phase,
            plan.rationale
        );
    }
    if let Some(ttp) = input.selected_ttp {
        let _ = writeln!(
            prompt,
            "Technique to depict: {} {} ({}): {}",
            ttp.id,
            ttp.name,
            ttp.tactic,
            ttp.description
        );
    }
    if let Some(feedback) = input.validation_feedback {
        let _ = writeln!(prompt, "Previous attempt rejected for: {feedback}");
        prompt.push_str("Fix every listed defect in this attempt.\n");
    }
    if let Some(feedback) = input.user_feedback {
        let _ = writeln!(prompt, "Incident Response Team performed: {feedback}");
        prompt.push_str(
            "The next inject must causally reflect that action: a mitigation leads to \
             recovery signs or forces the adversary onto a new vector; inaction leads \
             to escalation.\n",
        );
    }
    if !input.protected_assets.is_empty() {
        let protected =
            input.protected_assets.iter().map(EntityId::as_str).collect::<Vec<_>>().join(", ");
        let _ = writeln!(
            prompt,
            "Hardened assets (must not be the attack target): {protected}"
        );
    }
    if input.severity_bias < 0 {
        prompt.push_str("The response team is ahead; bias this inject toward de-escalation.\n");
    } else if input.severity_bias > 0 {
        prompt.push_str("The response is failing; bias this inject toward escalation.\n");
    }

    let _ = writeln!(prompt, "Constraints:");
    let _ = writeln!(prompt, "- inject_id must be exactly {}", input.inject_id);
    let _ = writeln!(
        prompt,
        "- time_offset must be T+HH:MM:SS format and not earlier than {}",
        input.min_offset
    );
    let _ = writeln!(prompt, "- phase must be {}", input.current_phase);
    prompt.push_str(
        "Return JSON with fields: inject_id, time_offset, phase, source, target, \
         modality (one of \"SIEM Alert\", \"Email\", \"Phone Call\", \"Physical Event\", \
         \"News Report\", \"Internal Report\"), content (at least 10 characters), \
         technical_metadata {mitre_id, affected_assets, ioc_hash, ioc_ip, ioc_domain, \
         severity}, business_impact.\n",
    );
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}

// ============================================================================
// SECTION: Critic Prompt
// ============================================================================

/// Builds the critic agent's logical-consistency prompt.
#[must_use]
pub fn critic_prompt(
    draft: &Inject,
    historical_context: &[String],
    snapshot: &BTreeMap<EntityId, Entity>,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You are auditing one draft inject of a financial-sector crisis exercise \
         for logical consistency.\n",
    );
    prompt.push_str(&history_block(historical_context));
    prompt.push_str(&asset_inventory(snapshot));
    let draft_json = serde_json::to_string(draft).unwrap_or_else(|_| draft.content.clone());
    let _ = writeln!(prompt, "Draft inject under review:\n{draft_json}");
    prompt.push_str(
        "Checklist:\n\
         1. The event must be plausible given the accepted injects.\n\
         2. Referenced assets must come from the valid asset list only.\n\
         3. The technique must fit the phase and follow causally from prior events.\n\
         4. Regulatory handling (detection, reporting, recovery) must be credible.\n",
    );
    prompt.push_str(
        "Return JSON with fields: logical_consistency (bool), regulatory_compliance \
         (bool), causal_validity (bool), errors (array of strings), warnings (array \
         of strings).\n",
    );
    prompt.push_str(JSON_ONLY_INSTRUCTION);
    prompt
}

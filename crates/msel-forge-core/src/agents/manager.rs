// crates/msel-forge-core/src/agents/manager.rs
// ============================================================================
// Module: MSEL Forge Manager Agent
// Description: High-level storyline planning for the next inject.
// Purpose: Turn scenario state into a structured plan, degrading gracefully.
// Dependencies: crate::agents::prompts, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The manager agent asks the language model for a storyline plan and parses
//! it tolerantly. A model failure or unparseable reply yields a minimal
//! default plan plus a warning; planning never blocks the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::agents::invoke_with_retry;
use crate::agents::prompts::manager_prompt;
use crate::core::CrisisPhase;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::ManagerPlan;
use crate::core::ScenarioType;
use crate::core::json::extract_json_object;
use crate::core::json::opt_str;
use crate::core::json::str_list;
use crate::interfaces::LanguageModel;
use crate::interfaces::LlmRequest;

// ============================================================================
// SECTION: Planning Outcome
// ============================================================================

/// Plan plus any warnings produced while obtaining it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    /// The plan to use for the next generation attempt.
    pub plan: ManagerPlan,
    /// Non-fatal problems encountered while planning.
    pub warnings: Vec<String>,
}

// ============================================================================
// SECTION: Manager Agent
// ============================================================================

/// Storyline planner over the language model.
pub struct ManagerAgent;

impl ManagerAgent {
    /// Produces a storyline plan for the next inject.
    ///
    /// Never fails: model or parse failures degrade to [`default_plan`].
    pub fn plan<L: LanguageModel>(
        model: &L,
        scenario_type: ScenarioType,
        current_phase: CrisisPhase,
        snapshot: &BTreeMap<EntityId, Entity>,
        historical_context: &[String],
    ) -> PlanOutcome {
        let prompt = manager_prompt(scenario_type, current_phase, snapshot, historical_context);
        let response = match invoke_with_retry(model, &LlmRequest::new(prompt)) {
            Ok(response) => response,
            Err(err) => {
                return PlanOutcome {
                    plan: default_plan(current_phase),
                    warnings: vec![format!("manager fell back to default plan: {err}")],
                };
            }
        };
        match extract_json_object(&response) {
            Ok(value) => {
                let mut warnings = Vec::new();
                let target_phase = opt_str(&value, "target_phase")
                    .and_then(|label| parse_phase(&label))
                    .filter(|phase| current_phase.permits(*phase))
                    .unwrap_or_else(|| {
                        warnings.push(
                            "manager plan target phase missing or illegal; using default"
                                .to_string(),
                        );
                        default_target(current_phase)
                    });
                let plan = ManagerPlan {
                    next_goal: opt_str(&value, "next_goal")
                        .unwrap_or_else(|| "advance the storyline".to_string()),
                    target_phase,
                    rationale: opt_str(&value, "rationale").unwrap_or_default(),
                    suggested_assets: str_list(&value, "suggested_assets")
                        .into_iter()
                        .map(EntityId::new)
                        .filter(|id| snapshot.contains_key(id))
                        .collect(),
                };
                PlanOutcome {
                    plan,
                    warnings,
                }
            }
            Err(err) => PlanOutcome {
                plan: default_plan(current_phase),
                warnings: vec![format!("manager plan unparseable, using default: {err}")],
            },
        }
    }
}

/// Minimal plan used when the model is unavailable or unparseable.
#[must_use]
pub fn default_plan(current_phase: CrisisPhase) -> ManagerPlan {
    ManagerPlan {
        next_goal: "advance the storyline".to_string(),
        target_phase: default_target(current_phase),
        rationale: "fallback plan after planner failure".to_string(),
        suggested_assets: Vec::new(),
    }
}

/// Default target phase: the first legal successor, or the current phase.
fn default_target(current_phase: CrisisPhase) -> CrisisPhase {
    current_phase.successors().first().copied().unwrap_or(current_phase)
}

/// Parses a phase wire label.
#[must_use]
pub fn parse_phase(label: &str) -> Option<CrisisPhase> {
    CrisisPhase::ALL.into_iter().find(|phase| phase.label() == label.trim())
}

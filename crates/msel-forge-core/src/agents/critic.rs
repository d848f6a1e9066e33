// crates/msel-forge-core/src/agents/critic.rs
// ============================================================================
// Module: MSEL Forge Critic Agent
// Description: Symbolic validation pipeline deciding accept/reject per draft.
// Purpose: Gate generated injects against schema, FSM, state, time, and logic.
// Dependencies: crate::agents::{compliance, prompts}, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The critic is the neuro-symbolic gate: the generator proposes, this
//! pipeline disposes. Checks run in a fixed order; any symbolic defect
//! rejects the draft without spending a model call, and a temporal regression
//! is marked in the audit record with the exact phrase
//! `Temporal error — no LLM call`. Legacy mode accepts every draft unchecked
//! and exists only to measure what the symbolic layer prevents. Quality
//! metrics are observability only and never drive the verdict.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::agents::compliance::ComplianceFramework;
use crate::agents::invoke_with_retry;
use crate::agents::prompts::critic_prompt;
use crate::core::CriticWeights;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::GenerationMode;
use crate::core::Inject;
use crate::core::InjectId;
use crate::core::MIN_CONTENT_CHARS;
use crate::core::ScoreStats;
use crate::core::TimeOffset;
use crate::core::ValidationIssue;
use crate::core::ValidationIssueKind;
use crate::core::ValidationMetrics;
use crate::core::ValidationResult;
use crate::core::hashing::HashDigest;
use crate::core::hashing::hash_canonical_json;
use crate::core::json::bool_or;
use crate::core::json::extract_json_object;
use crate::core::json::str_list;
use crate::core::validation::REFERENCE_QUALITY_MEAN;
use crate::interfaces::LanguageModel;
use crate::interfaces::LlmRequest;

// ============================================================================
// SECTION: Audit Marker
// ============================================================================

/// Audit marker recorded when the temporal check short-circuits the model call.
pub const TEMPORAL_NO_LLM_MARKER: &str = "Temporal error — no LLM call";

// ============================================================================
// SECTION: Critic Input
// ============================================================================

/// Inputs for one validation attempt.
///
/// # Invariants
/// - `snapshot` is the exact state the generator saw for this draft.
#[derive(Debug)]
pub struct CriticInput<'a> {
    /// Draft under validation.
    pub draft: &'a Inject,
    /// Identifiers of injects already accepted into the scenario.
    pub accepted_ids: &'a [InjectId],
    /// Offset of the last accepted inject, if any.
    pub last_offset: Option<TimeOffset>,
    /// Phase of the scenario before this draft.
    pub current_phase: crate::core::CrisisPhase,
    /// Current asset snapshot.
    pub snapshot: &'a BTreeMap<EntityId, Entity>,
    /// Summaries of accepted injects for the model prompt.
    pub historical_context: &'a [String],
    /// Tactic of the technique attached to the draft, if known.
    pub draft_tactic: Option<&'a str>,
    /// Tactics of techniques attached to accepted injects, in order.
    pub prior_tactics: &'a [String],
    /// Validation mode for this run.
    pub mode: GenerationMode,
    /// Compliance standards enabled for this run (framework names).
    pub standards: &'a [String],
    /// Overall quality scores of prior validation attempts in this run.
    pub prior_scores: &'a [f64],
}

// ============================================================================
// SECTION: Critic Outcome
// ============================================================================

/// Forensic audit record for one validation attempt.
///
/// # Invariants
/// - Carries the exact critic inputs, not a paraphrase; the verdict must be
///   reproducible from this record alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticAudit {
    /// Full state snapshot the critic received.
    pub snapshot: BTreeMap<EntityId, Entity>,
    /// Canonical hash of the snapshot, when hashing succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_hash: Option<HashDigest>,
    /// Draft under validation.
    pub draft: Inject,
    /// Prior inject summaries the critic received.
    pub prior_summaries: Vec<String>,
    /// Raw model response, or the temporal short-circuit marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_response: Option<String>,
    /// Error strings attached to the verdict.
    pub errors: Vec<String>,
    /// Warning strings attached to the verdict.
    pub warnings: Vec<String>,
    /// Final decision: `accept` or `reject`.
    pub decision: String,
}

/// Verdict, audit record, and overall score for one validation attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticOutcome {
    /// Structured verdict handed to the controller.
    pub result: ValidationResult,
    /// Forensic audit record for the trace.
    pub audit: CriticAudit,
}

// ============================================================================
// SECTION: Critic Agent
// ============================================================================

/// Symbolic validator over draft injects.
pub struct CriticAgent {
    /// Weights for the overall quality score.
    weights: CriticWeights,
    /// Registered compliance frameworks, resolved per run by name.
    registry: Vec<ComplianceFramework>,
}

impl CriticAgent {
    /// Creates a critic with explicit weights and a framework registry.
    #[must_use]
    pub const fn new(weights: CriticWeights, registry: Vec<ComplianceFramework>) -> Self {
        Self {
            weights,
            registry,
        }
    }

    /// Creates a critic with default weights and the built-in frameworks.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new(
            CriticWeights::default(),
            vec![
                crate::agents::compliance::dora(),
                crate::agents::compliance::nist(),
                crate::agents::compliance::iso27001(),
            ],
        )
    }

    /// Registers a user-extended compliance framework.
    pub fn register_framework(&mut self, framework: ComplianceFramework) {
        self.registry.push(framework);
    }

    /// Validates one draft inject.
    ///
    /// Never fails: model unavailability degrades to a rejection with the
    /// `validator unavailable` reason, which still counts against the refine
    /// budget.
    pub fn validate<L: LanguageModel>(&self, model: &L, input: &CriticInput<'_>) -> CriticOutcome {
        if input.mode == GenerationMode::Legacy {
            let result = ValidationResult::accept_unchecked();
            let audit = self.build_audit(input, None, &result, "accept");
            return CriticOutcome {
                result,
                audit,
            };
        }

        let mut errors: Vec<ValidationIssue> = Vec::new();
        let mut warnings: Vec<ValidationIssue> = Vec::new();

        // Step 1: schema.
        let schema_errors = schema_check(input.draft, input.accepted_ids);
        let schema_failed = !schema_errors.is_empty();
        errors.extend(schema_errors);

        let mut temporal_ok = true;
        let mut asset_score = 1.0;
        let mut causal_score = 1.0;
        let mut temporal_short_circuit = false;

        if !schema_failed {
            // Step 2: phase-transition FSM.
            if !input.current_phase.permits(input.draft.phase) {
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::Fsm,
                    format!(
                        "illegal phase transition: {} -> {}",
                        input.current_phase, input.draft.phase
                    ),
                ));
            }

            // Step 3: state consistency.
            asset_score = state_check(input.draft, input.snapshot, &mut errors, &mut warnings);

            // Step 4: temporal ordering. Purely symbolic; on failure the
            // model is never consulted.
            if let Some(last) = input.last_offset
                && input.draft.time_offset < last
            {
                temporal_ok = false;
                temporal_short_circuit = true;
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::Temporal,
                    format!(
                        "time offset {} regresses behind accepted {}",
                        input.draft.time_offset, last
                    ),
                ));
            }

            // Step 5: causal plausibility.
            causal_score =
                causal_check(input.draft_tactic, input.prior_tactics, &mut errors, &mut warnings);
        }

        // Step 6: model-assisted logical consistency, only on symbolically
        // clean drafts.
        let mut logical_consistency = errors.is_empty();
        let mut causal_validity = causal_score > 0.0;
        let mut regulatory_compliance = true;
        let mut llm_response: Option<String> = None;
        if errors.is_empty() {
            match invoke_with_retry(
                model,
                &LlmRequest::new(critic_prompt(
                    input.draft,
                    input.historical_context,
                    input.snapshot,
                )),
            ) {
                Ok(response) => {
                    llm_response = Some(response.clone());
                    match extract_json_object(&response) {
                        Ok(verdict) => {
                            logical_consistency = bool_or(&verdict, "logical_consistency", true);
                            regulatory_compliance =
                                bool_or(&verdict, "regulatory_compliance", true);
                            causal_validity = bool_or(&verdict, "causal_validity", true);
                            for message in str_list(&verdict, "errors") {
                                errors.push(ValidationIssue::new(
                                    ValidationIssueKind::Logical,
                                    message,
                                ));
                            }
                            for message in str_list(&verdict, "warnings") {
                                warnings.push(ValidationIssue::new(
                                    ValidationIssueKind::Logical,
                                    message,
                                ));
                            }
                            if !logical_consistency && errors.is_empty() {
                                errors.push(ValidationIssue::new(
                                    ValidationIssueKind::Logical,
                                    "model flagged logical inconsistency",
                                ));
                            }
                        }
                        Err(err) => {
                            logical_consistency = false;
                            errors.push(ValidationIssue::new(
                                ValidationIssueKind::Validator,
                                format!("validator unavailable: malformed verdict ({err})"),
                            ));
                        }
                    }
                }
                Err(err) => {
                    logical_consistency = false;
                    errors.push(ValidationIssue::new(
                        ValidationIssueKind::Validator,
                        format!("validator unavailable: {err}"),
                    ));
                }
            }
        } else if temporal_short_circuit {
            llm_response = Some(TEMPORAL_NO_LLM_MARKER.to_string());
        }

        // Step 7: compliance frameworks (warnings only, never a gate).
        let compliance_score = self.compliance_check(input.draft, input.standards, &mut warnings);

        let logic_score = if logical_consistency { 1.0 } else { 0.0 };
        let temporal_score = if temporal_ok { 1.0 } else { 0.0 };
        let overall = self.weights.logic * logic_score
            + self.weights.causal * causal_score
            + self.weights.compliance * compliance_score
            + self.weights.temporal * temporal_score
            + self.weights.asset * asset_score;

        let mut stats = ScoreStats::new();
        for score in input.prior_scores {
            stats.record(*score);
        }
        let (confidence_interval, p_value) = if stats.len() >= 2 {
            (stats.confidence_interval(), stats.p_value_against(REFERENCE_QUALITY_MEAN))
        } else {
            (None, None)
        };

        let metrics = ValidationMetrics {
            logical_consistency_score: logic_score,
            causal_validity_score: causal_score,
            compliance_score,
            temporal_consistency_score: temporal_score,
            asset_consistency_score: asset_score,
            overall_quality_score: overall,
            confidence_interval,
            p_value,
        };

        let result = ValidationResult {
            is_valid: errors.is_empty(),
            logical_consistency,
            compliance_ok: regulatory_compliance,
            causal_validity,
            errors,
            warnings,
            metrics: Some(metrics),
        };
        let decision = if result.is_valid { "accept" } else { "reject" };
        let audit = self.build_audit(input, llm_response, &result, decision);
        CriticOutcome {
            result,
            audit,
        }
    }

    /// Evaluates every enabled framework, appending mandatory-gap warnings.
    fn compliance_check(
        &self,
        draft: &Inject,
        standards: &[String],
        warnings: &mut Vec<ValidationIssue>,
    ) -> f64 {
        let mut total = 0.0;
        let mut evaluated = 0usize;
        for standard in standards {
            let Some(framework) = self
                .registry
                .iter()
                .find(|framework| framework.name.eq_ignore_ascii_case(standard))
            else {
                warnings.push(ValidationIssue::new(
                    ValidationIssueKind::Compliance,
                    format!("unknown compliance standard: {standard}"),
                ));
                continue;
            };
            let report = framework.evaluate(draft);
            for requirement_id in &report.missing_mandatory {
                warnings.push(ValidationIssue::new(
                    ValidationIssueKind::Compliance,
                    format!(
                        "missing mandatory requirement {requirement_id} ({})",
                        report.framework
                    ),
                ));
            }
            total += report.score;
            evaluated += 1;
        }
        if evaluated == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss, reason = "Framework counts stay far below 2^52.")]
        let count = evaluated as f64;
        total / count
    }

    /// Assembles the forensic audit record for one attempt.
    fn build_audit(
        &self,
        input: &CriticInput<'_>,
        llm_response: Option<String>,
        result: &ValidationResult,
        decision: &str,
    ) -> CriticAudit {
        CriticAudit {
            snapshot: input.snapshot.clone(),
            snapshot_hash: hash_canonical_json(input.snapshot).ok(),
            draft: input.draft.clone(),
            prior_summaries: input.historical_context.to_vec(),
            llm_response,
            errors: result.errors.iter().map(ToString::to_string).collect(),
            warnings: result.warnings.iter().map(ToString::to_string).collect(),
            decision: decision.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Symbolic Checks
// ============================================================================

/// Structural checks over the draft (step 1).
fn schema_check(draft: &Inject, accepted_ids: &[InjectId]) -> Vec<ValidationIssue> {
    let mut errors = Vec::new();
    if draft.content.trim().chars().count() < MIN_CONTENT_CHARS {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::Schema,
            format!("content shorter than {MIN_CONTENT_CHARS} characters after trim"),
        ));
    }
    if InjectId::parse(draft.inject_id.as_str()).is_err() {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::Schema,
            format!("inject id does not match the INJ- wire form: {}", draft.inject_id),
        ));
    }
    if accepted_ids.contains(&draft.inject_id) {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::Schema,
            format!("duplicate inject id: {}", draft.inject_id),
        ));
    }
    if draft.source.trim().is_empty() || draft.target.trim().is_empty() {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::Schema,
            "source and target must be non-empty",
        ));
    }
    errors
}

/// Asset-existence and naming checks (step 3). Returns the asset score.
fn state_check(
    draft: &Inject,
    snapshot: &BTreeMap<EntityId, Entity>,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) -> f64 {
    let assets = &draft.technical_metadata.affected_assets;
    if assets.is_empty() {
        return 1.0;
    }
    let mut valid = 0usize;
    for asset_id in assets {
        match snapshot.get(asset_id) {
            Some(entity) => {
                valid += 1;
                let content = &draft.content;
                if !content.contains(asset_id.as_str()) && !content.contains(&entity.name) {
                    warnings.push(ValidationIssue::new(
                        ValidationIssueKind::State,
                        format!("asset {asset_id} is not named canonically in the content"),
                    ));
                }
            }
            None => {
                errors.push(ValidationIssue::new(
                    ValidationIssueKind::State,
                    format!("asset not found: {asset_id}"),
                ));
            }
        }
    }
    #[allow(clippy::cast_precision_loss, reason = "Asset counts stay far below 2^52.")]
    let score = valid as f64 / assets.len() as f64;
    score
}

/// Tactics that establish adversary access for causal sequencing.
const ACCESS_TACTICS: [&str; 6] = [
    "initial-access",
    "execution",
    "persistence",
    "privilege-escalation",
    "credential-access",
    "lateral-movement",
];

/// Tactics that are impossible before access is established.
const POST_ACCESS_TACTICS: [&str; 3] = ["exfiltration", "impact", "collection"];

/// Technique sequencing checks (step 5). Returns the causal score.
///
/// Only truly impossible sequences block; merely unusual ones warn.
fn causal_check(
    draft_tactic: Option<&str>,
    prior_tactics: &[String],
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) -> f64 {
    let Some(tactic) = draft_tactic else {
        return 1.0;
    };
    let access_established =
        prior_tactics.iter().any(|prior| ACCESS_TACTICS.contains(&prior.as_str()));
    if POST_ACCESS_TACTICS.contains(&tactic) && !access_established {
        errors.push(ValidationIssue::new(
            ValidationIssueKind::Causal,
            format!("impossible sequence: {tactic} before any initial access"),
        ));
        return 0.0;
    }
    if tactic == "lateral-movement" && prior_tactics.is_empty() {
        warnings.push(ValidationIssue::new(
            ValidationIssueKind::Causal,
            "unusual sequence: lateral movement with no prior technique",
        ));
        return 0.5;
    }
    1.0
}

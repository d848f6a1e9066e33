// crates/msel-forge-core/src/agents/generator.rs
// ============================================================================
// Module: MSEL Forge Generator Agent
// Description: Synthesizes one draft inject from plan, intel, and state.
// Purpose: Produce candidate injects and repair common model malformations.
// Dependencies: crate::agents::prompts, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The generator asks the language model for one draft inject and repairs
//! common malformations: missing fields fall back to safe defaults, unknown
//! field names are dropped, and identifiers/offsets that violate the stated
//! constraints are replaced with the expected values. When parsing fails
//! entirely the agent emits a stub inject whose content is deliberately below
//! the schema minimum so the critic rejects it on the next step.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

use crate::agents::invoke_with_retry;
use crate::agents::manager::parse_phase;
use crate::agents::prompts::GeneratorPromptInput;
use crate::agents::prompts::generator_prompt;
use crate::core::EntityId;
use crate::core::Inject;
use crate::core::InjectId;
use crate::core::Modality;
use crate::core::TechnicalMetadata;
use crate::core::TimeOffset;
use crate::core::Timestamp;
use crate::core::TtpId;
use crate::core::json::extract_json_object;
use crate::core::json::opt_str;
use crate::core::json::str_list;
use crate::interfaces::LanguageModel;
use crate::interfaces::LlmRequest;

// ============================================================================
// SECTION: Draft Outcome
// ============================================================================

/// Draft inject plus provenance for the forensic trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftOutcome {
    /// The draft handed to the critic.
    pub inject: Inject,
    /// Raw model completion, when one was received.
    pub raw_response: Option<String>,
    /// Non-fatal problems encountered while drafting.
    pub warnings: Vec<String>,
}

// ============================================================================
// SECTION: Generator Agent
// ============================================================================

/// Draft-inject synthesizer over the language model.
pub struct GeneratorAgent;

impl GeneratorAgent {
    /// Produces one draft inject for the critic to validate.
    ///
    /// Never fails: model failures yield a stub draft the critic rejects.
    pub fn draft<L: LanguageModel>(
        model: &L,
        input: &GeneratorPromptInput<'_>,
        created_at: Timestamp,
    ) -> DraftOutcome {
        let prompt = generator_prompt(input);
        let response = match invoke_with_retry(model, &LlmRequest::new(prompt)) {
            Ok(response) => response,
            Err(err) => {
                return DraftOutcome {
                    inject: stub_inject(input, created_at),
                    raw_response: None,
                    warnings: vec![format!("generator fell back to stub inject: {err}")],
                };
            }
        };
        match extract_json_object(&response) {
            Ok(value) => {
                let (inject, warnings) = repair_draft(&value, input, created_at);
                DraftOutcome {
                    inject,
                    raw_response: Some(response),
                    warnings,
                }
            }
            Err(err) => DraftOutcome {
                inject: stub_inject(input, created_at),
                raw_response: Some(response),
                warnings: vec![format!("generator output unparseable, emitting stub: {err}")],
            },
        }
    }
}

// ============================================================================
// SECTION: Draft Repair
// ============================================================================

/// Default step added to the minimum offset when the model omits one.
const DEFAULT_STEP_SECONDS: u64 = 300;

/// Builds an [`Inject`] from a parsed model object, repairing malformations.
fn repair_draft(
    value: &Value,
    input: &GeneratorPromptInput<'_>,
    created_at: Timestamp,
) -> (Inject, Vec<String>) {
    let mut warnings = Vec::new();

    let inject_id = match opt_str(value, "inject_id").map(InjectId::parse) {
        Some(Ok(id)) => id,
        Some(Err(err)) => {
            warnings.push(format!("draft carried a malformed inject id, replaced: {err}"));
            input.inject_id.clone()
        }
        None => {
            warnings.push("draft omitted inject_id, using expected id".to_string());
            input.inject_id.clone()
        }
    };

    let time_offset = match opt_str(value, "time_offset").map(|raw| TimeOffset::parse(&raw)) {
        Some(Ok(offset)) => offset,
        Some(Err(err)) => {
            warnings.push(format!("draft carried a malformed time offset, replaced: {err}"));
            input.min_offset.advanced_by(DEFAULT_STEP_SECONDS)
        }
        None => {
            warnings.push("draft omitted time_offset, advancing from last accepted".to_string());
            input.min_offset.advanced_by(DEFAULT_STEP_SECONDS)
        }
    };

    let phase = match opt_str(value, "phase").as_deref().map(parse_phase) {
        Some(Some(phase)) => phase,
        _ => {
            warnings.push("draft omitted or mangled phase, using current phase".to_string());
            input.current_phase
        }
    };

    let modality = opt_str(value, "modality")
        .and_then(|label| parse_modality(&label))
        .unwrap_or(Modality::SiemAlert);

    let metadata_value = value.get("technical_metadata").cloned().unwrap_or(Value::Null);
    let technical_metadata = TechnicalMetadata {
        mitre_id: opt_str(&metadata_value, "mitre_id")
            .map(TtpId::new)
            .or_else(|| input.selected_ttp.map(|ttp| ttp.id.clone())),
        affected_assets: str_list(&metadata_value, "affected_assets")
            .into_iter()
            .map(EntityId::new)
            .collect(),
        ioc_hash: opt_str(&metadata_value, "ioc_hash"),
        ioc_ip: opt_str(&metadata_value, "ioc_ip"),
        ioc_domain: opt_str(&metadata_value, "ioc_domain"),
        severity: opt_str(&metadata_value, "severity"),
    };

    let inject = Inject {
        inject_id,
        time_offset,
        phase,
        source: opt_str(value, "source").unwrap_or_else(|| "Red Team".to_string()),
        target: opt_str(value, "target").unwrap_or_else(|| "Blue Team / SOC".to_string()),
        modality,
        content: opt_str(value, "content").unwrap_or_default(),
        technical_metadata,
        compliance_tag: opt_str(value, "compliance_tag"),
        business_impact: opt_str(value, "business_impact"),
        created_at,
    };
    (inject, warnings)
}

/// Stub draft emitted when no usable model output exists.
///
/// Content is below the schema minimum on purpose; the critic rejects it and
/// the refine loop re-prompts with the rejection reason.
fn stub_inject(input: &GeneratorPromptInput<'_>, created_at: Timestamp) -> Inject {
    Inject {
        inject_id: input.inject_id.clone(),
        time_offset: input.min_offset.advanced_by(DEFAULT_STEP_SECONDS),
        phase: input.current_phase,
        source: "Red Team".to_string(),
        target: "Blue Team / SOC".to_string(),
        modality: Modality::SiemAlert,
        content: "stub".to_string(),
        technical_metadata: TechnicalMetadata {
            mitre_id: input.selected_ttp.map(|ttp| ttp.id.clone()),
            ..TechnicalMetadata::default()
        },
        compliance_tag: None,
        business_impact: None,
        created_at,
    }
}

/// Parses a modality wire label.
fn parse_modality(label: &str) -> Option<Modality> {
    const ALL: [Modality; 6] = [
        Modality::SiemAlert,
        Modality::Email,
        Modality::PhoneCall,
        Modality::PhysicalEvent,
        Modality::NewsReport,
        Modality::InternalReport,
    ];
    ALL.into_iter().find(|modality| modality.label() == label.trim())
}

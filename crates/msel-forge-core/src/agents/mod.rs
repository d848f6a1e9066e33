// crates/msel-forge-core/src/agents/mod.rs
// ============================================================================
// Module: MSEL Forge Agents
// Description: Manager, generator, and critic agents plus compliance checks.
// Purpose: Wrap language-model interaction with typed records and fallbacks.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Each agent turns model text into a typed record and owns its degradation
//! path: the manager falls back to a default plan, the generator to a stub
//! draft, and the critic to a `validator unavailable` rejection. Model calls
//! get exactly one transient retry at this layer; further resilience is the
//! controller's refine loop.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod compliance;
pub mod critic;
pub mod generator;
pub mod manager;
pub mod prompts;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use compliance::ComplianceFramework;
pub use compliance::ComplianceRequirement;
pub use compliance::FrameworkReport;
pub use compliance::builtin_framework;
pub use critic::CriticAgent;
pub use critic::CriticAudit;
pub use critic::CriticInput;
pub use critic::CriticOutcome;
pub use critic::TEMPORAL_NO_LLM_MARKER;
pub use generator::DraftOutcome;
pub use generator::GeneratorAgent;
pub use manager::ManagerAgent;
pub use manager::PlanOutcome;
pub use prompts::GeneratorPromptInput;
pub use prompts::JSON_ONLY_INSTRUCTION;
pub use prompts::summarize_inject;

// ============================================================================
// SECTION: Retry Helper
// ============================================================================

use crate::interfaces::LanguageModel;
use crate::interfaces::LlmError;
use crate::interfaces::LlmRequest;

/// Invokes the model with a single transient retry.
///
/// # Errors
///
/// Returns [`LlmError`] when both the call and its retry fail.
pub fn invoke_with_retry<L: LanguageModel>(
    model: &L,
    request: &LlmRequest,
) -> Result<String, LlmError> {
    match model.invoke(request) {
        Ok(response) => Ok(response),
        Err(_) => model.invoke(request),
    }
}

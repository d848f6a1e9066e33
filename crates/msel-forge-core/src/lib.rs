// crates/msel-forge-core/src/lib.rs
// ============================================================================
// Module: MSEL Forge Core Library
// Description: Public API surface for the MSEL Forge scenario engine.
// Purpose: Expose core types, interfaces, agents, and runtime helpers.
// Dependencies: crate::{agents, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! MSEL Forge core generates crisis-exercise scenarios for financial
//! institutions as a neuro-symbolic loop: a language model proposes injects,
//! a symbolic critic disposes of them against a graph of simulated assets,
//! and state mutates only on acceptance. The crate is backend-agnostic and
//! integrates through explicit interfaces rather than embedding into agent
//! frameworks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod agents;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use agents::ComplianceFramework;
pub use agents::ComplianceRequirement;
pub use agents::CriticAgent;
pub use agents::CriticAudit;
pub use agents::CriticInput;
pub use agents::CriticOutcome;
pub use agents::GeneratorAgent;
pub use agents::ManagerAgent;
pub use agents::TEMPORAL_NO_LLM_MARKER;
pub use agents::builtin_framework;
pub use interfaces::GraphStore;
pub use interfaces::IntelError;
pub use interfaces::LanguageModel;
pub use interfaces::LlmError;
pub use interfaces::LlmRequest;
pub use interfaces::StoreError;
pub use interfaces::VectorStore;
pub use runtime::Controller;
pub use runtime::ControllerConfig;
pub use runtime::ControllerError;
pub use runtime::DEFAULT_MAX_ITERATIONS;
pub use runtime::Engine;
pub use runtime::EngineError;
pub use runtime::GenerateRequest;
pub use runtime::InMemoryGraphStore;
pub use runtime::InfrastructureTemplate;
pub use runtime::IntelProvider;
pub use runtime::RunReport;
pub use runtime::StateStore;
pub use runtime::StateUpdater;
pub use runtime::hallucinations_prevented;

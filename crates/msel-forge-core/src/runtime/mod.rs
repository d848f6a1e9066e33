// crates/msel-forge-core/src/runtime/mod.rs
// ============================================================================
// Module: MSEL Forge Runtime
// Description: Controller state machine, state store, intel, and engine API.
// Purpose: Execute scenario generation over the agent and backend interfaces.
// Dependencies: crate::{agents, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the generation state machine, the authoritative
//! state store, intel retrieval, state updates, decision catalogs, and the
//! public engine API. All surfaces must call into the same controller logic
//! to preserve invariance and auditability.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod controller;
pub mod decision;
pub mod engine;
pub mod intel;
pub mod state_store;
pub mod state_update;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use controller::Controller;
pub use controller::ControllerConfig;
pub use controller::ControllerError;
pub use controller::NodeId;
pub use controller::NodeOutcome;
pub use controller::PostUpdate;
pub use controller::REFINE_BUDGET;
pub use controller::RefineDecision;
pub use controller::should_ask_decision;
pub use controller::should_continue;
pub use controller::should_refine;
pub use decision::build_decision_point;
pub use engine::DEFAULT_MAX_ITERATIONS;
pub use engine::Engine;
pub use engine::EngineError;
pub use engine::GenerateRequest;
pub use engine::RunReport;
pub use engine::hallucinated_assets;
pub use engine::hallucinations_prevented;
pub use intel::IntelProvider;
pub use intel::IntelSelection;
pub use intel::curated_ttps;
pub use intel::phase_query;
pub use state_store::InMemoryGraphStore;
pub use state_store::InfrastructureTemplate;
pub use state_store::StateStore;
pub use state_update::StateUpdater;
pub use state_update::UpdateOutcome;
pub use state_update::derive_target_status;

// crates/msel-forge-core/src/core/mod.rs
// ============================================================================
// Module: MSEL Forge Core Data Model
// Description: Identifiers, injects, entities, phases, verdicts, and traces.
// Purpose: Define the canonical records shared by agents and the runtime.
// Dependencies: serde, serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! The core data model is deliberately free of I/O: records, invariants, and
//! pure helpers only. Agents and the runtime operate over these types through
//! the interfaces module.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod entity;
pub mod hashing;
pub mod identifiers;
pub mod inject;
pub mod json;
pub mod phase;
pub mod state;
pub mod time;
pub mod trace;
pub mod ttp;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entity::Criticality;
pub use entity::Entity;
pub use entity::EntityStatus;
pub use entity::EntityType;
pub use entity::Relationship;
pub use entity::RelationshipType;
pub use identifiers::ChoiceId;
pub use identifiers::EntityId;
pub use identifiers::InjectId;
pub use identifiers::InjectIdError;
pub use identifiers::ScenarioId;
pub use identifiers::TtpId;
pub use inject::Inject;
pub use inject::MIN_CONTENT_CHARS;
pub use inject::Modality;
pub use inject::Scenario;
pub use inject::TechnicalMetadata;
pub use inject::TimelineRow;
pub use phase::CrisisPhase;
pub use phase::ScenarioType;
pub use state::DecisionImpact;
pub use state::DecisionOption;
pub use state::EndCondition;
pub use state::GenerationMode;
pub use state::ManagerPlan;
pub use state::PendingDecision;
pub use state::RunMetadata;
pub use state::UserDecision;
pub use state::WorkflowState;
pub use time::TimeOffset;
pub use time::TimeOffsetError;
pub use time::Timestamp;
pub use trace::JsonlTraceSink;
pub use trace::MemoryTraceSink;
pub use trace::TraceError;
pub use trace::TraceEventKind;
pub use trace::TraceRecord;
pub use trace::TraceSink;
pub use ttp::Ttp;
pub use ttp::TtpHit;
pub use validation::CriticWeights;
pub use validation::REFERENCE_QUALITY_MEAN;
pub use validation::ScoreStats;
pub use validation::ValidationIssue;
pub use validation::ValidationIssueKind;
pub use validation::ValidationMetrics;
pub use validation::ValidationResult;

// crates/msel-forge-core/src/interfaces/mod.rs
// ============================================================================
// Module: MSEL Forge Interfaces
// Description: Backend-agnostic interfaces for models, graphs, and intel.
// Purpose: Define the contract surfaces used by the MSEL Forge runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how MSEL Forge integrates with external systems without
//! embedding backend-specific details. Implementations must be deterministic
//! where the contract requires it and fail closed on missing or invalid data.
//! The canonical graph statements named by the system design live in the
//! graph store adapter crate, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Entity;
use crate::core::EntityId;
use crate::core::EntityStatus;
use crate::core::InjectId;
use crate::core::Relationship;
use crate::core::Timestamp;
use crate::core::TtpHit;

// ============================================================================
// SECTION: Language Model
// ============================================================================

/// Request submitted to a language model backend.
///
/// # Invariants
/// - `prompt` already carries any JSON-only output instruction; backends must
///   not rewrite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Optional model hint forwarded to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_hint: Option<String>,
}

impl LlmRequest {
    /// Creates a request with no model hint.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_hint: None,
        }
    }
}

/// Language model errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend was unreachable or timed out after its retry budget.
    #[error("language model unavailable: {0}")]
    Unavailable(String),
    /// Backend replied but the payload was unusable.
    #[error("language model returned malformed output: {0}")]
    Malformed(String),
}

/// Opaque text-to-text language model backend.
///
/// Agents treat every failure as transient and degrade to their documented
/// fallback outputs; an [`LlmError`] never crosses the controller boundary.
pub trait LanguageModel {
    /// Invokes the model and returns the raw completion text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the backend is unavailable or its reply is
    /// unusable.
    fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError>;
}

// ============================================================================
// SECTION: Graph Store
// ============================================================================

/// Graph store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend connection failure.
    #[error("graph store connection error: {0}")]
    Connection(String),
    /// Backend rejected a statement.
    #[error("graph store statement error: {0}")]
    Statement(String),
    /// Backend returned data that failed to map to core records.
    #[error("graph store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("graph store error: {0}")]
    Store(String),
}

/// Backend-agnostic graph of assets and typed relationships.
///
/// Reads must reflect all prior successful writes within the same run.
/// Writes are best-effort atomic per entity; no cross-entity transactional
/// guarantees are required.
pub trait GraphStore {
    /// Deletes every entity and relationship.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the wipe fails.
    fn wipe(&self) -> Result<(), StoreError>;

    /// Creates one entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the create fails.
    fn create_entity(&self, entity: &Entity) -> Result<(), StoreError>;

    /// Creates one directed relationship between existing entities.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the create fails.
    fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError>;

    /// Returns all entities.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn entities(&self) -> Result<Vec<Entity>, StoreError>;

    /// Returns one entity by id, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, StoreError>;

    /// Writes a status with update attribution.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the entity is unknown.
    fn set_status(
        &self,
        id: &EntityId,
        status: EntityStatus,
        inject_id: Option<&InjectId>,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Returns entities reachable via one outgoing relationship hop.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the traversal fails.
    fn neighbors_out(&self, id: &EntityId) -> Result<Vec<Entity>, StoreError>;

    /// Reports store readiness for liveness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Vector Store
// ============================================================================

/// Intel retrieval errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum IntelError {
    /// Backing store was unreachable.
    #[error("intel store unavailable: {0}")]
    Unavailable(String),
    /// Backing store returned unusable rows.
    #[error("intel store invalid data: {0}")]
    Invalid(String),
}

/// Opaque similarity search over stored adversary techniques.
pub trait VectorStore {
    /// Returns up to `k` technique hits ranked by relevance to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`IntelError`] when the search cannot be served.
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<TtpHit>, IntelError>;
}

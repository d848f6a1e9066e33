// crates/msel-forge-core/src/core/identifiers.rs
// ============================================================================
// Module: MSEL Forge Identifiers
// Description: Canonical opaque identifiers for scenarios, injects, and assets.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the canonical identifiers used throughout MSEL Forge.
//! Identifiers are opaque strings on the wire. Inject identifiers enforce the
//! `INJ-` + digits invariant at construction boundaries; scenario identifiers
//! carry an engine-assigned sequence form when the caller supplies none. All
//! comparisons are byte-wise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Scenario Identifier
// ============================================================================

/// Scenario identifier for one generation run.
///
/// Keys the engine's run registry and stamps every forensic trace record, so
/// a trace file can be filtered back into per-run timelines offline.
///
/// # Invariants
/// - Caller-supplied values are accepted verbatim and compared byte-wise.
/// - Engine-assigned values use the [`ScenarioId::from_sequence`] form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a scenario identifier from a caller-supplied value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds the engine-assigned identifier for a 1-based run sequence
    /// number (`scenario-0001`, `scenario-0002`, ...).
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("scenario-{sequence:04}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Inject Identifier
// ============================================================================

/// Error raised when an inject identifier fails the wire-format check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid inject id: {0}")]
pub struct InjectIdError(String);

/// Inject identifier, unique within a scenario.
///
/// # Invariants
/// - Wire form is `INJ-` followed by at least three ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InjectId(String);

impl InjectId {
    /// Parses an inject identifier, enforcing the `INJ-` + digits form.
    ///
    /// # Errors
    ///
    /// Returns [`InjectIdError`] when the value does not match `INJ-` followed
    /// by at least three ASCII digits.
    pub fn parse(value: impl Into<String>) -> Result<Self, InjectIdError> {
        let value = value.into();
        let Some(digits) = value.strip_prefix("INJ-") else {
            return Err(InjectIdError(value));
        };
        if digits.len() < 3 || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(InjectIdError(value));
        }
        Ok(Self(value))
    }

    /// Builds the canonical identifier for a 1-based inject ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: u64) -> Self {
        Self(format!("INJ-{ordinal:03}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Entity Identifier
// ============================================================================

/// Asset identifier within the simulated infrastructure graph.
///
/// # Invariants
/// - Matches the graph node's `id` property byte-for-byte; seeding templates
///   own the naming convention (`SRV-CORE-001`, `DB-PROD-01`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new entity identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Technique Identifier
// ============================================================================

/// Adversary technique identifier (MITRE-style, e.g. `T1566`).
///
/// # Invariants
/// - Compared byte-wise; `T`-prefixed framework numbering is the curated
///   catalog's convention, not enforced here, so intel backends may carry
///   in-house technique ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TtpId(String);

impl TtpId {
    /// Creates a new technique identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TtpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TtpId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Choice Identifier
// ============================================================================

/// Branching-option identifier presented at interactive decision points.
///
/// # Invariants
/// - Unique within one decision point's option list; decision catalogs use
///   kebab-case labels (`isolate-affected`, `monitor-only`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceId(String);

impl ChoiceId {
    /// Creates a new choice identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

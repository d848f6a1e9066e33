// crates/msel-forge-core/src/core/ttp.rs
// ============================================================================
// Module: MSEL Forge Adversary Techniques
// Description: Tactic/technique/procedure records selected per crisis phase.
// Purpose: Model the intel payload attached to generated injects.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A TTP is one adversary technique drawn from a MITRE-style framework. The
//! intel provider ranks candidates per phase; the controller attaches one to
//! each generation attempt and the critic uses the sequence of attached
//! techniques for causal plausibility checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::TtpId;

// ============================================================================
// SECTION: Technique Record
// ============================================================================

/// One adversary tactic, technique, or procedure.
///
/// # Invariants
/// - `tactic` uses lowercase MITRE tactic naming (`initial-access`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ttp {
    /// Technique identifier.
    pub id: TtpId,
    /// Technique name.
    pub name: String,
    /// Owning tactic.
    pub tactic: String,
    /// Technique description used in prompts.
    pub description: String,
}

impl Ttp {
    /// Creates a new technique record.
    #[must_use]
    pub fn new(
        id: impl Into<TtpId>,
        name: impl Into<String>,
        tactic: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tactic: tactic.into(),
            description: description.into(),
        }
    }
}

/// One ranked hit returned by a similarity search over stored techniques.
///
/// # Invariants
/// - `score` is a relevance value where higher means more relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtpHit {
    /// Matched technique.
    pub ttp: Ttp,
    /// Relevance score assigned by the backing store.
    pub score: f64,
}

// crates/msel-forge-core/src/core/inject.rs
// ============================================================================
// Module: MSEL Forge Injects and Scenarios
// Description: Timeline events (injects) and the scenario record holding them.
// Purpose: Model the Master Scenario Event List with stable wire forms.
// Dependencies: crate::core::{identifiers, phase, time}, serde
// ============================================================================

//! ## Overview
//! An inject is one atomic event in a crisis-exercise timeline. Accepted
//! injects are appended to the owning [`Scenario`] in non-decreasing
//! [`TimeOffset`] order; the critic enforces ordering and phase legality
//! before any append happens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EntityId;
use crate::core::identifiers::InjectId;
use crate::core::identifiers::ScenarioId;
use crate::core::identifiers::TtpId;
use crate::core::phase::CrisisPhase;
use crate::core::phase::ScenarioType;
use crate::core::time::TimeOffset;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Delivery Modality
// ============================================================================

/// Channel through which an inject reaches exercise participants.
///
/// # Invariants
/// - Wire strings are fixed and human-facing; do not rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modality {
    /// Alert raised by the SIEM platform.
    #[serde(rename = "SIEM Alert")]
    SiemAlert,
    /// Email delivered to a participant inbox.
    #[serde(rename = "Email")]
    Email,
    /// Scripted phone call.
    #[serde(rename = "Phone Call")]
    PhoneCall,
    /// Physical-world event (site access, hardware).
    #[serde(rename = "Physical Event")]
    PhysicalEvent,
    /// Simulated press coverage.
    #[serde(rename = "News Report")]
    NewsReport,
    /// Internal situation report or memo.
    #[serde(rename = "Internal Report")]
    InternalReport,
}

impl Modality {
    /// Returns the wire label used in prompts and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SiemAlert => "SIEM Alert",
            Self::Email => "Email",
            Self::PhoneCall => "Phone Call",
            Self::PhysicalEvent => "Physical Event",
            Self::NewsReport => "News Report",
            Self::InternalReport => "Internal Report",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Technical Metadata
// ============================================================================

/// Technical annotations attached to an inject.
///
/// # Invariants
/// - Every entry of `affected_assets` must exist in the state snapshot at the
///   time the inject is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalMetadata {
    /// MITRE-style technique identifier, if attributed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitre_id: Option<TtpId>,
    /// Assets directly affected by this inject.
    #[serde(default)]
    pub affected_assets: Vec<EntityId>,
    /// Indicator of compromise: file hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ioc_hash: Option<String>,
    /// Indicator of compromise: IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ioc_ip: Option<String>,
    /// Indicator of compromise: domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ioc_domain: Option<String>,
    /// Free-form severity label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

// ============================================================================
// SECTION: Inject Record
// ============================================================================

/// One atomic event in a crisis-exercise timeline.
///
/// # Invariants
/// - `inject_id` is unique within its scenario.
/// - `content` is at least ten characters after trimming.
/// - `time_offset` is non-decreasing across a scenario's accepted injects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inject {
    /// Inject identifier (`INJ-001` style).
    pub inject_id: InjectId,
    /// Offset relative to scenario start.
    pub time_offset: TimeOffset,
    /// Crisis phase this inject belongs to.
    pub phase: CrisisPhase,
    /// Acting party delivering the event ("Red Team", "Management").
    pub source: String,
    /// Receiving party ("Blue Team / SOC").
    pub target: String,
    /// Delivery channel.
    pub modality: Modality,
    /// Event prose presented to participants.
    pub content: String,
    /// Technical annotations.
    #[serde(default)]
    pub technical_metadata: TechnicalMetadata,
    /// Compliance framework tag, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance_tag: Option<String>,
    /// Business impact summary, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<String>,
    /// Creation timestamp supplied by the host.
    pub created_at: Timestamp,
}

/// Minimum trimmed content length accepted by the schema check.
pub const MIN_CONTENT_CHARS: usize = 10;

// ============================================================================
// SECTION: Scenario Record
// ============================================================================

/// One generated crisis-exercise scenario (Master Scenario Event List).
///
/// # Invariants
/// - `injects` is append-only and ordered by non-decreasing `time_offset`.
/// - `current_phase` tracks the phase of the last accepted inject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub scenario_id: ScenarioId,
    /// Scenario archetype.
    pub scenario_type: ScenarioType,
    /// Current crisis phase.
    pub current_phase: CrisisPhase,
    /// Accepted injects in timeline order.
    pub injects: Vec<Inject>,
    /// Scenario start timestamp supplied by the host.
    pub start_time: Timestamp,
    /// Free-form scenario metadata.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Scenario {
    /// Creates an empty scenario in the initial phase.
    #[must_use]
    pub fn new(scenario_id: ScenarioId, scenario_type: ScenarioType, start_time: Timestamp) -> Self {
        Self {
            scenario_id,
            scenario_type,
            current_phase: CrisisPhase::NormalOperation,
            injects: Vec::new(),
            start_time,
            metadata: serde_json::Map::new(),
        }
    }

    /// Returns the offset of the last accepted inject, if any.
    #[must_use]
    pub fn last_offset(&self) -> Option<TimeOffset> {
        self.injects.last().map(|inject| inject.time_offset)
    }

    /// Returns the ordered timeline rows for operator-facing display.
    #[must_use]
    pub fn to_timeline(&self) -> Vec<TimelineRow> {
        self.injects
            .iter()
            .map(|inject| TimelineRow {
                inject_id: inject.inject_id.clone(),
                time_offset: inject.time_offset,
                phase: inject.phase,
                source: inject.source.clone(),
                target: inject.target.clone(),
                modality: inject.modality,
                content: inject.content.clone(),
            })
            .collect()
    }
}

/// One operator-facing row of the scenario timeline.
///
/// # Invariants
/// - Rows mirror accepted injects; no additional validation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    /// Inject identifier.
    pub inject_id: InjectId,
    /// Offset relative to scenario start.
    pub time_offset: TimeOffset,
    /// Crisis phase of the inject.
    pub phase: CrisisPhase,
    /// Acting party.
    pub source: String,
    /// Receiving party.
    pub target: String,
    /// Delivery channel.
    pub modality: Modality,
    /// Event prose.
    pub content: String,
}

// crates/msel-forge-core/src/core/phase.rs
// ============================================================================
// Module: MSEL Forge Crisis Phases
// Description: Crisis maturity phases and the legal phase-transition machine.
// Purpose: Provide the symbolic FSM that gates inject phase progression.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A scenario moves through six crisis phases. The transition table below is
//! the single source of truth for legal successors; the critic rejects any
//! draft inject whose phase is not a permitted successor of the scenario's
//! current phase. Self-transitions are always permitted (a phase may hold).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Crisis Phase
// ============================================================================

/// Crisis maturity phase for a scenario timeline.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrisisPhase {
    /// Business as usual; baseline traffic and routine events.
    NormalOperation,
    /// Early anomalies that may or may not be an incident.
    SuspiciousActivity,
    /// A confirmed incident with limited scope.
    InitialIncident,
    /// The incident escalates into an organisational crisis.
    EscalationCrisis,
    /// Active containment of the adversary and affected assets.
    Containment,
    /// Restoration of services and return to normal operation.
    Recovery,
}

impl CrisisPhase {
    /// All phases in canonical narrative order.
    pub const ALL: [Self; 6] = [
        Self::NormalOperation,
        Self::SuspiciousActivity,
        Self::InitialIncident,
        Self::EscalationCrisis,
        Self::Containment,
        Self::Recovery,
    ];

    /// Returns the legal successor phases for this phase.
    ///
    /// The table mirrors the crisis-exercise playbook: incidents may only
    /// escalate, be contained, or recover along these edges.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::NormalOperation => &[Self::SuspiciousActivity, Self::InitialIncident],
            Self::SuspiciousActivity => &[Self::InitialIncident, Self::NormalOperation],
            Self::InitialIncident => &[Self::EscalationCrisis, Self::Containment],
            Self::EscalationCrisis => &[Self::Containment],
            Self::Containment => &[Self::Recovery, Self::EscalationCrisis],
            Self::Recovery => &[Self::NormalOperation],
        }
    }

    /// Returns true when `next` is a legal transition target from this phase.
    ///
    /// Staying in the current phase is always legal.
    #[must_use]
    pub fn permits(self, next: Self) -> bool {
        self == next || self.successors().contains(&next)
    }

    /// Returns the wire label used in prompts and trace records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NormalOperation => "NORMAL_OPERATION",
            Self::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            Self::InitialIncident => "INITIAL_INCIDENT",
            Self::EscalationCrisis => "ESCALATION_CRISIS",
            Self::Containment => "CONTAINMENT",
            Self::Recovery => "RECOVERY",
        }
    }
}

impl fmt::Display for CrisisPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Scenario Type
// ============================================================================

/// Exercise scenario archetype driving plans, intel queries, and decisions.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioType {
    /// Ransomware with data theft and extortion pressure.
    RansomwareDoubleExtortion,
    /// Distributed denial of service against critical business functions.
    DdosCriticalFunctions,
    /// Compromise introduced through a third-party supplier.
    SupplyChainCompromise,
    /// Insider manipulating data from a trusted position.
    InsiderThreatDataManipulation,
}

impl ScenarioType {
    /// Returns the wire label used in prompts and trace records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RansomwareDoubleExtortion => "RANSOMWARE_DOUBLE_EXTORTION",
            Self::DdosCriticalFunctions => "DDOS_CRITICAL_FUNCTIONS",
            Self::SupplyChainCompromise => "SUPPLY_CHAIN_COMPROMISE",
            Self::InsiderThreatDataManipulation => "INSIDER_THREAT_DATA_MANIPULATION",
        }
    }

    /// Returns a short human-readable description for prompts.
    #[must_use]
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::RansomwareDoubleExtortion => {
                "a ransomware campaign with data exfiltration and double extortion"
            }
            Self::DdosCriticalFunctions => {
                "a sustained DDoS campaign against critical payment and trading functions"
            }
            Self::SupplyChainCompromise => {
                "a compromise delivered through a trusted software supplier"
            }
            Self::InsiderThreatDataManipulation => {
                "an insider manipulating financial records from a trusted position"
            }
        }
    }
}

impl fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// crates/msel-forge-core/src/runtime/intel.rs
// ============================================================================
// Module: MSEL Forge Intel Provider
// Description: Phase-ranked adversary technique retrieval with fallback.
// Purpose: Keep generation supplied with plausible TTP candidates.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The intel provider returns ranked technique candidates for the current
//! crisis phase. A vector store, when configured, serves similarity-ranked
//! hits for a phase-specific query; when it is absent, fails, or returns
//! nothing, a deterministic curated catalog answers instead so generation
//! never stalls.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CrisisPhase;
use crate::core::ScenarioType;
use crate::core::Ttp;
use crate::interfaces::VectorStore;

// ============================================================================
// SECTION: Selection Result
// ============================================================================

/// Ranked technique candidates plus their provenance.
///
/// # Invariants
/// - `ttps` is never empty for any phase/type combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelSelection {
    /// Ranked candidate techniques.
    pub ttps: Vec<Ttp>,
    /// True when the curated fallback answered instead of the vector store.
    pub used_fallback: bool,
}

// ============================================================================
// SECTION: Intel Provider
// ============================================================================

/// Technique retrieval over an optional vector store with curated fallback.
pub struct IntelProvider<V> {
    /// Optional similarity-search backend.
    vector: Option<V>,
}

impl<V: VectorStore> IntelProvider<V> {
    /// Creates a provider backed by a vector store.
    pub const fn new(vector: V) -> Self {
        Self {
            vector: Some(vector),
        }
    }

    /// Creates a provider that always answers from the curated catalog.
    pub const fn curated_only() -> Self {
        Self {
            vector: None,
        }
    }

    /// Returns up to `k` ranked techniques for the phase.
    ///
    /// Falls back to the curated catalog when the vector store is absent,
    /// errors, or returns no hits.
    #[must_use]
    pub fn get_ttps(
        &self,
        scenario_type: ScenarioType,
        phase: CrisisPhase,
        k: usize,
    ) -> IntelSelection {
        if let Some(vector) = &self.vector {
            let query = phase_query(scenario_type, phase);
            if let Ok(hits) = vector.similarity_search(&query, k)
                && !hits.is_empty()
            {
                return IntelSelection {
                    ttps: hits.into_iter().map(|hit| hit.ttp).collect(),
                    used_fallback: false,
                };
            }
        }
        let mut ttps = curated_ttps(scenario_type, phase);
        ttps.truncate(k.max(1));
        IntelSelection {
            ttps,
            used_fallback: true,
        }
    }
}

/// Builds the phase-specific similarity query.
#[must_use]
pub fn phase_query(scenario_type: ScenarioType, phase: CrisisPhase) -> String {
    format!(
        "adversary techniques used during the {} phase of {}",
        phase.label(),
        scenario_type.narrative()
    )
}

// ============================================================================
// SECTION: Curated Catalog
// ============================================================================

/// Returns the curated, deterministic technique list for a phase.
///
/// Scenario-type techniques rank first so the selection stays on-theme.
#[must_use]
pub fn curated_ttps(scenario_type: ScenarioType, phase: CrisisPhase) -> Vec<Ttp> {
    let mut out: Vec<Ttp> = Vec::new();
    let candidates = type_specific_ttps(scenario_type, phase)
        .into_iter()
        .chain(phase_base_ttps(phase));
    for ttp in candidates {
        if !out.iter().any(|existing| existing.id == ttp.id) {
            out.push(ttp);
        }
    }
    out
}

/// Phase-generic techniques common across scenario types.
fn phase_base_ttps(phase: CrisisPhase) -> Vec<Ttp> {
    match phase {
        CrisisPhase::NormalOperation => vec![
            Ttp::new("T1595", "Active Scanning", "reconnaissance", "Adversary probes externally reachable services for weaknesses."),
            Ttp::new("T1598", "Phishing for Information", "reconnaissance", "Targeted messages harvest organisational details from staff."),
            Ttp::new("T1590", "Gather Victim Network Information", "reconnaissance", "Adversary maps network ranges, hosting, and dependencies."),
        ],
        CrisisPhase::SuspiciousActivity => vec![
            Ttp::new("T1566", "Phishing", "initial-access", "Spearphishing delivers a malicious attachment or link to staff."),
            Ttp::new("T1190", "Exploit Public-Facing Application", "initial-access", "An internet-facing service is exploited for a foothold."),
            Ttp::new("T1078", "Valid Accounts", "initial-access", "Stolen credentials grant access through legitimate channels."),
        ],
        CrisisPhase::InitialIncident => vec![
            Ttp::new("T1059", "Command and Scripting Interpreter", "execution", "Scripts execute adversary payloads on compromised hosts."),
            Ttp::new("T1204", "User Execution", "execution", "A user is induced to run the adversary's payload."),
            Ttp::new("T1133", "External Remote Services", "persistence", "Remote access services sustain the adversary's foothold."),
        ],
        CrisisPhase::EscalationCrisis => vec![
            Ttp::new("T1021", "Remote Services", "lateral-movement", "The adversary pivots across hosts over internal services."),
            Ttp::new("T1041", "Exfiltration Over C2 Channel", "exfiltration", "Collected data leaves through the existing command channel."),
            Ttp::new("T1489", "Service Stop", "impact", "Business services are stopped to maximise disruption."),
        ],
        CrisisPhase::Containment => vec![
            Ttp::new("T1070", "Indicator Removal", "defense-evasion", "The adversary deletes logs and artifacts ahead of responders."),
            Ttp::new("T1490", "Inhibit System Recovery", "impact", "Backups and recovery tooling are disabled or destroyed."),
            Ttp::new("T1105", "Ingress Tool Transfer", "command-and-control", "Fresh tooling is staged to re-establish footholds."),
        ],
        CrisisPhase::Recovery => vec![
            Ttp::new("T1136", "Create Account", "persistence", "Hidden accounts attempt to outlive remediation."),
            Ttp::new("T1098", "Account Manipulation", "persistence", "Existing accounts are altered to retain access."),
        ],
    }
}

/// Scenario-type techniques layered ahead of the phase base list.
fn type_specific_ttps(scenario_type: ScenarioType, phase: CrisisPhase) -> Vec<Ttp> {
    match (scenario_type, phase) {
        (ScenarioType::RansomwareDoubleExtortion, CrisisPhase::EscalationCrisis) => vec![
            Ttp::new("T1486", "Data Encrypted for Impact", "impact", "Ransomware encrypts production data and demands payment."),
            Ttp::new("T1657", "Financial Theft", "impact", "Extortion pressure is applied against stolen data."),
        ],
        (ScenarioType::RansomwareDoubleExtortion, CrisisPhase::InitialIncident) => vec![Ttp::new(
            "T1560",
            "Archive Collected Data",
            "collection",
            "Data is staged and archived ahead of exfiltration.",
        )],
        (ScenarioType::DdosCriticalFunctions, _) => vec![
            Ttp::new("T1498", "Network Denial of Service", "impact", "Volumetric traffic saturates critical network paths."),
            Ttp::new("T1499", "Endpoint Denial of Service", "impact", "Application-layer floods exhaust service capacity."),
        ],
        (ScenarioType::SupplyChainCompromise, _) => vec![Ttp::new(
            "T1195",
            "Supply Chain Compromise",
            "initial-access",
            "A trusted supplier's artifact carries the adversary's code.",
        )],
        (ScenarioType::InsiderThreatDataManipulation, _) => vec![Ttp::new(
            "T1565",
            "Data Manipulation",
            "impact",
            "Records are altered from a trusted position to mislead the business.",
        )],
        _ => Vec::new(),
    }
}

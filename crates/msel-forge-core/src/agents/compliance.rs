// crates/msel-forge-core/src/agents/compliance.rs
// ============================================================================
// Module: MSEL Forge Compliance Frameworks
// Description: Requirement checklists for DORA, NIST, and ISO 27001.
// Purpose: Score injects against regulatory expectations per crisis phase.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Compliance validation is a quality signal, never a hard gate: missing
//! mandatory requirements produce warnings, and the satisfied fraction feeds
//! the compliance score. Requirements are keyword/phase heuristics over
//! inject content and metadata; hosts may extend the framework set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::CrisisPhase;
use crate::core::Inject;

// ============================================================================
// SECTION: Requirement Model
// ============================================================================

/// One framework requirement evaluated against an inject.
///
/// # Invariants
/// - An empty `phases` list means the requirement applies in every phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRequirement {
    /// Stable requirement identifier (e.g. `DORA-17`).
    pub id: String,
    /// Requirement description.
    pub description: String,
    /// Phases the requirement applies to (empty = all).
    pub phases: Vec<CrisisPhase>,
    /// Keywords satisfying the requirement when found in the inject.
    pub keywords: Vec<String>,
    /// Whether a miss produces a warning.
    pub mandatory: bool,
}

impl ComplianceRequirement {
    /// Returns true when the requirement applies to the inject's phase.
    #[must_use]
    pub fn applies_to(&self, phase: CrisisPhase) -> bool {
        self.phases.is_empty() || self.phases.contains(&phase)
    }

    /// Returns true when the inject satisfies the requirement.
    #[must_use]
    pub fn satisfied_by(&self, inject: &Inject) -> bool {
        let mut haystack = inject.content.to_lowercase();
        if let Some(tag) = &inject.compliance_tag {
            haystack.push(' ');
            haystack.push_str(&tag.to_lowercase());
        }
        if let Some(impact) = &inject.business_impact {
            haystack.push(' ');
            haystack.push_str(&impact.to_lowercase());
        }
        self.keywords.iter().any(|keyword| haystack.contains(keyword.as_str()))
    }
}

/// One compliance framework: a named requirement checklist.
///
/// # Invariants
/// - Requirement identifiers are unique within a framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceFramework {
    /// Framework name (`DORA`, `NIST`, `ISO27001`, or user-extended).
    pub name: String,
    /// Requirement checklist.
    pub requirements: Vec<ComplianceRequirement>,
}

/// Evaluation report for one framework against one inject.
///
/// # Invariants
/// - `score` is the satisfied fraction of applicable requirements (1.0 when
///   none apply).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkReport {
    /// Framework name.
    pub framework: String,
    /// Identifiers of missed mandatory requirements.
    pub missing_mandatory: Vec<String>,
    /// Satisfied fraction of applicable requirements.
    pub score: f64,
}

impl ComplianceFramework {
    /// Evaluates the framework checklist against an inject.
    #[must_use]
    pub fn evaluate(&self, inject: &Inject) -> FrameworkReport {
        let applicable: Vec<&ComplianceRequirement> =
            self.requirements.iter().filter(|req| req.applies_to(inject.phase)).collect();
        if applicable.is_empty() {
            return FrameworkReport {
                framework: self.name.clone(),
                missing_mandatory: Vec::new(),
                score: 1.0,
            };
        }
        let mut satisfied = 0usize;
        let mut missing_mandatory = Vec::new();
        for requirement in &applicable {
            if requirement.satisfied_by(inject) {
                satisfied += 1;
            } else if requirement.mandatory {
                missing_mandatory.push(requirement.id.clone());
            }
        }
        #[allow(clippy::cast_precision_loss, reason = "Checklist sizes stay far below 2^52.")]
        let score = satisfied as f64 / applicable.len() as f64;
        FrameworkReport {
            framework: self.name.clone(),
            missing_mandatory,
            score,
        }
    }
}

// ============================================================================
// SECTION: Built-In Frameworks
// ============================================================================

/// Builds a framework by name, when it is one of the built-ins.
#[must_use]
pub fn builtin_framework(name: &str) -> Option<ComplianceFramework> {
    match name.to_ascii_uppercase().as_str() {
        "DORA" => Some(dora()),
        "NIST" => Some(nist()),
        "ISO27001" => Some(iso27001()),
        _ => None,
    }
}

/// Shorthand requirement constructor for the built-in checklists.
fn requirement(
    id: &str,
    description: &str,
    phases: &[CrisisPhase],
    keywords: &[&str],
    mandatory: bool,
) -> ComplianceRequirement {
    ComplianceRequirement {
        id: id.to_string(),
        description: description.to_string(),
        phases: phases.to_vec(),
        keywords: keywords.iter().map(|keyword| (*keyword).to_string()).collect(),
        mandatory,
    }
}

/// EU Digital Operational Resilience Act checklist.
#[must_use]
pub fn dora() -> ComplianceFramework {
    ComplianceFramework {
        name: "DORA".to_string(),
        requirements: vec![
            requirement(
                "DORA-17",
                "ICT incidents are detected and classified",
                &[CrisisPhase::SuspiciousActivity, CrisisPhase::InitialIncident],
                &["detect", "alert", "classif", "siem", "monitor"],
                true,
            ),
            requirement(
                "DORA-19",
                "Major incidents are reported to the competent authority",
                &[CrisisPhase::EscalationCrisis, CrisisPhase::Containment],
                &["regulator", "authority", "report", "notif"],
                true,
            ),
            requirement(
                "DORA-11",
                "Backup and restoration capabilities are exercised",
                &[CrisisPhase::Recovery],
                &["backup", "restor", "recover"],
                true,
            ),
            requirement(
                "DORA-14",
                "Crisis communication reaches clients and counterparts",
                &[CrisisPhase::EscalationCrisis, CrisisPhase::Containment, CrisisPhase::Recovery],
                &["communicat", "client", "press", "statement"],
                false,
            ),
        ],
    }
}

/// NIST incident-response lifecycle checklist.
#[must_use]
pub fn nist() -> ComplianceFramework {
    ComplianceFramework {
        name: "NIST".to_string(),
        requirements: vec![
            requirement(
                "NIST-DE",
                "Anomalies and events are detected and analysed",
                &[CrisisPhase::SuspiciousActivity, CrisisPhase::InitialIncident],
                &["detect", "alert", "analys", "triage"],
                true,
            ),
            requirement(
                "NIST-CO",
                "The incident is contained",
                &[CrisisPhase::Containment],
                &["contain", "isolat", "block", "quarantine"],
                true,
            ),
            requirement(
                "NIST-RC",
                "Operations are recovered and verified",
                &[CrisisPhase::Recovery],
                &["recover", "restor", "verif"],
                true,
            ),
            requirement(
                "NIST-PO",
                "Post-incident lessons are captured",
                &[CrisisPhase::Recovery],
                &["lesson", "review", "retrospective", "post-incident"],
                false,
            ),
        ],
    }
}

/// ISO/IEC 27001 Annex A incident-management checklist.
#[must_use]
pub fn iso27001() -> ComplianceFramework {
    ComplianceFramework {
        name: "ISO27001".to_string(),
        requirements: vec![
            requirement(
                "ISO-A-8-16",
                "Networks and systems are monitored for anomalous activity",
                &[CrisisPhase::NormalOperation, CrisisPhase::SuspiciousActivity],
                &["monitor", "log", "baseline", "alert"],
                false,
            ),
            requirement(
                "ISO-A-5-26",
                "Information security incidents receive a managed response",
                &[
                    CrisisPhase::InitialIncident,
                    CrisisPhase::EscalationCrisis,
                    CrisisPhase::Containment,
                ],
                &["respon", "escalat", "incident manager", "crisis team"],
                true,
            ),
            requirement(
                "ISO-A-5-29",
                "Business continuity is maintained during disruption",
                &[CrisisPhase::EscalationCrisis, CrisisPhase::Containment, CrisisPhase::Recovery],
                &["continuity", "failover", "fallback", "manual process"],
                false,
            ),
        ],
    }
}

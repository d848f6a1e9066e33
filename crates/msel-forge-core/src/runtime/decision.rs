// crates/msel-forge-core/src/runtime/decision.rs
// ============================================================================
// Module: MSEL Forge Decision Catalogs
// Description: Scripted branching options per phase and scenario type.
// Purpose: Supply decision points with concrete, state-aware response options.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Decision points present pre-computed branching options to an external
//! caller. Options are scripted per phase and scenario type and reference
//! real assets from the current snapshot, so their mapped effects always
//! apply cleanly. Every catalog ends with a do-nothing option that amplifies
//! severity; inaction must have consequences.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::ChoiceId;
use crate::core::CrisisPhase;
use crate::core::Criticality;
use crate::core::DecisionImpact;
use crate::core::DecisionOption;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::EntityStatus;
use crate::core::EntityType;
use crate::core::PendingDecision;
use crate::core::ScenarioType;

// ============================================================================
// SECTION: Catalog Entry Point
// ============================================================================

/// Builds the decision point raised after the given inject position.
#[must_use]
pub fn build_decision_point(
    scenario_type: ScenarioType,
    phase: CrisisPhase,
    after_inject: usize,
    snapshot: &BTreeMap<EntityId, Entity>,
) -> PendingDecision {
    let mut options = phase_options(phase, snapshot);
    if let Some(extra) = type_option(scenario_type, snapshot) {
        options.push(extra);
    }
    options.push(DecisionOption {
        choice_id: ChoiceId::new("monitor-only"),
        label: "Continue monitoring only".to_string(),
        description: "Take no active countermeasure and keep observing.".to_string(),
        impacts: vec![DecisionImpact::AmplifySeverity],
    });
    PendingDecision {
        phase,
        after_inject,
        options,
    }
}

// ============================================================================
// SECTION: Phase Catalogs
// ============================================================================

/// Scripted options for the current phase.
fn phase_options(phase: CrisisPhase, snapshot: &BTreeMap<EntityId, Entity>) -> Vec<DecisionOption> {
    match phase {
        CrisisPhase::EscalationCrisis => {
            let mut impacts: Vec<DecisionImpact> = impacted_assets(snapshot)
                .into_iter()
                .take(2)
                .map(|asset| DecisionImpact::SetStatus {
                    asset,
                    status: EntityStatus::Offline,
                })
                .collect();
            impacts.push(DecisionImpact::DampenSeverity);
            vec![
                DecisionOption {
                    choice_id: ChoiceId::new("isolate-affected"),
                    label: "Isolate affected systems".to_string(),
                    description: "Cut network access to compromised assets, accepting downtime."
                        .to_string(),
                    impacts,
                },
                DecisionOption {
                    choice_id: ChoiceId::new("engage-ir"),
                    label: "Engage the external IR retainer".to_string(),
                    description: "Bring in the incident-response retainer to harden crown jewels."
                        .to_string(),
                    impacts: protect_critical(snapshot)
                        .into_iter()
                        .chain(std::iter::once(DecisionImpact::DampenSeverity))
                        .collect(),
                },
            ]
        }
        CrisisPhase::Containment => vec![
            DecisionOption {
                choice_id: ChoiceId::new("restore-backups"),
                label: "Restore from clean backups".to_string(),
                description: "Rebuild impacted systems from verified backups.".to_string(),
                impacts: impacted_assets(snapshot)
                    .into_iter()
                    .take(2)
                    .map(|asset| DecisionImpact::SetStatus {
                        asset,
                        status: EntityStatus::Online,
                    })
                    .chain(std::iter::once(DecisionImpact::DampenSeverity))
                    .collect(),
            },
            DecisionOption {
                choice_id: ChoiceId::new("rotate-credentials"),
                label: "Rotate credentials estate-wide".to_string(),
                description: "Force credential rotation and harden privileged access.".to_string(),
                impacts: protect_critical(snapshot)
                    .into_iter()
                    .chain(std::iter::once(DecisionImpact::DampenSeverity))
                    .collect(),
            },
        ],
        _ => vec![
            DecisionOption {
                choice_id: ChoiceId::new("activate-crisis-team"),
                label: "Activate the crisis management team".to_string(),
                description: "Stand up the crisis team and start structured response.".to_string(),
                impacts: vec![DecisionImpact::DampenSeverity],
            },
            DecisionOption {
                choice_id: ChoiceId::new("isolate-suspect"),
                label: "Isolate the suspect asset".to_string(),
                description: "Take the most suspect asset offline pending forensics.".to_string(),
                impacts: impacted_assets(snapshot)
                    .into_iter()
                    .take(1)
                    .map(|asset| DecisionImpact::SetStatus {
                        asset,
                        status: EntityStatus::Offline,
                    })
                    .chain(std::iter::once(DecisionImpact::DampenSeverity))
                    .collect(),
            },
        ],
    }
}

/// One scenario-type-specific option, when the estate supports it.
fn type_option(
    scenario_type: ScenarioType,
    snapshot: &BTreeMap<EntityId, Entity>,
) -> Option<DecisionOption> {
    match scenario_type {
        ScenarioType::RansomwareDoubleExtortion => {
            let database = snapshot
                .values()
                .find(|entity| entity.entity_type == EntityType::Database)
                .map(|entity| entity.id.clone())?;
            Some(DecisionOption {
                choice_id: ChoiceId::new("air-gap-backups"),
                label: "Air-gap database backups".to_string(),
                description: "Disconnect backup storage before the ransomware reaches it."
                    .to_string(),
                impacts: vec![
                    DecisionImpact::Protect {
                        asset: database,
                    },
                    DecisionImpact::DampenSeverity,
                ],
            })
        }
        ScenarioType::DdosCriticalFunctions => {
            let server = snapshot
                .values()
                .find(|entity| entity.entity_type == EntityType::Server)
                .map(|entity| entity.id.clone())?;
            Some(DecisionOption {
                choice_id: ChoiceId::new("enable-scrubbing"),
                label: "Enable upstream traffic scrubbing".to_string(),
                description: "Route inbound traffic through the scrubbing provider.".to_string(),
                impacts: vec![
                    DecisionImpact::Protect {
                        asset: server,
                    },
                    DecisionImpact::DampenSeverity,
                ],
            })
        }
        ScenarioType::SupplyChainCompromise => Some(DecisionOption {
            choice_id: ChoiceId::new("freeze-deployments"),
            label: "Freeze supplier deployments".to_string(),
            description: "Halt all third-party software rollouts pending verification."
                .to_string(),
            impacts: vec![DecisionImpact::DampenSeverity],
        }),
        ScenarioType::InsiderThreatDataManipulation => Some(DecisionOption {
            choice_id: ChoiceId::new("suspend-insider-access"),
            label: "Suspend the suspect's access".to_string(),
            description: "Disable the suspect account set and preserve evidence.".to_string(),
            impacts: vec![DecisionImpact::DampenSeverity],
        }),
    }
}

// ============================================================================
// SECTION: Snapshot Helpers
// ============================================================================

/// Assets currently showing adversary impact, most severe first.
fn impacted_assets(snapshot: &BTreeMap<EntityId, Entity>) -> Vec<EntityId> {
    let mut impacted: Vec<&Entity> = snapshot
        .values()
        .filter(|entity| entity.status.severity_rank() > EntityStatus::Online.severity_rank())
        .collect();
    impacted.sort_by(|a, b| b.status.severity_rank().cmp(&a.status.severity_rank()));
    impacted.into_iter().map(|entity| entity.id.clone()).collect()
}

/// Protection impacts for up to two critical assets.
fn protect_critical(snapshot: &BTreeMap<EntityId, Entity>) -> Vec<DecisionImpact> {
    snapshot
        .values()
        .filter(|entity| entity.criticality == Criticality::Critical)
        .take(2)
        .map(|entity| DecisionImpact::Protect {
            asset: entity.id.clone(),
        })
        .collect()
}

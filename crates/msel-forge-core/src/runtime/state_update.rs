// crates/msel-forge-core/src/runtime/state_update.rs
// ============================================================================
// Module: MSEL Forge State Updater
// Description: Applies accepted injects to the infrastructure graph.
// Purpose: Derive status effects, cascade to dependents, attribute writes.
// Dependencies: crate::core, crate::interfaces, crate::runtime::state_store
// ============================================================================

//! ## Overview
//! On acceptance, an inject's prose implies a target status for each directly
//! affected asset (keyword mapping), with the precedence lattice
//! `compromised > degraded > offline > suspicious`. Within a single inject a
//! status is never downgraded to a less severe one. Dependents reachable via
//! one outgoing hop receive a softened status unless already worse. Partial
//! cascade failure surfaces as a warning, not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::Entity;
use crate::core::EntityId;
use crate::core::EntityStatus;
use crate::core::Inject;
use crate::core::Timestamp;
use crate::interfaces::GraphStore;
use crate::runtime::state_store::StateStore;

// ============================================================================
// SECTION: Update Outcome
// ============================================================================

/// Result of applying one accepted inject to system state.
///
/// # Invariants
/// - `primary_updates` and `cascade_updates` list writes that succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Direct status writes applied to affected assets.
    pub primary_updates: Vec<(EntityId, EntityStatus)>,
    /// Second-order status writes applied to dependents.
    pub cascade_updates: Vec<(EntityId, EntityStatus)>,
    /// Non-fatal problems encountered while applying effects.
    pub warnings: Vec<String>,
}

// ============================================================================
// SECTION: State Updater
// ============================================================================

/// Applies accepted injects to the state store with inject attribution.
pub struct StateUpdater;

impl StateUpdater {
    /// Applies the inject's effects and returns the applied writes.
    ///
    /// The local `snapshot` is mutated alongside the store so the next
    /// generation prompt sees the post-update state even when store reads
    /// fail transiently.
    pub fn apply<G: GraphStore>(
        store: &StateStore<G>,
        snapshot: &mut BTreeMap<EntityId, Entity>,
        inject: &Inject,
        at: Timestamp,
    ) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        let Some(target_status) = derive_target_status(&inject.content) else {
            return outcome;
        };

        for asset_id in &inject.technical_metadata.affected_assets {
            let current = snapshot.get(asset_id).map(|entity| entity.status);
            let effective = escalate_only(current, target_status);
            let Some(effective) = effective else {
                continue;
            };
            match store.update_entity_status(asset_id, effective, Some(&inject.inject_id), at) {
                Ok(()) => {
                    apply_to_snapshot(snapshot, asset_id, effective, inject, at);
                    outcome.primary_updates.push((asset_id.clone(), effective));
                }
                Err(err) => {
                    outcome.warnings.push(format!("status write failed for {asset_id}: {err}"));
                    continue;
                }
            }

            let softened = soften(effective);
            let Some(softened) = softened else {
                continue;
            };
            let dependents = match store.get_affected_entities(asset_id) {
                Ok(dependents) => dependents,
                Err(err) => {
                    outcome.warnings.push(format!("cascade lookup failed for {asset_id}: {err}"));
                    continue;
                }
            };
            for dependent in dependents {
                if dependent.status.severity_rank() >= softened.severity_rank() {
                    continue;
                }
                match store.update_entity_status(
                    &dependent.id,
                    softened,
                    Some(&inject.inject_id),
                    at,
                ) {
                    Ok(()) => {
                        apply_to_snapshot(snapshot, &dependent.id, softened, inject, at);
                        outcome.cascade_updates.push((dependent.id.clone(), softened));
                    }
                    Err(err) => {
                        outcome
                            .warnings
                            .push(format!("cascade write failed for {}: {err}", dependent.id));
                    }
                }
            }
        }
        outcome
    }
}

// ============================================================================
// SECTION: Status Derivation
// ============================================================================

/// Derives the target status implied by inject prose.
///
/// When several keyword groups match, the most severe target wins.
#[must_use]
pub fn derive_target_status(content: &str) -> Option<EntityStatus> {
    let lowered = content.to_lowercase();
    let compromised = ["compromised", "encrypted", "breach", "ransomware"]
        .iter()
        .any(|keyword| lowered.contains(keyword));
    if compromised {
        return Some(EntityStatus::Compromised);
    }
    let degraded =
        ["degraded", "suspicious", "anomaly"].iter().any(|keyword| lowered.contains(keyword));
    if degraded {
        return Some(EntityStatus::Degraded);
    }
    let offline = ["offline", "down"].iter().any(|keyword| lowered.contains(keyword));
    if offline {
        return Some(EntityStatus::Offline);
    }
    None
}

/// Returns the effective status, refusing severity downgrades.
fn escalate_only(current: Option<EntityStatus>, target: EntityStatus) -> Option<EntityStatus> {
    match current {
        Some(current) if current.severity_rank() >= target.severity_rank() => None,
        _ => Some(target),
    }
}

/// Returns the softened status a dependent receives from a primary effect.
const fn soften(primary: EntityStatus) -> Option<EntityStatus> {
    match primary {
        EntityStatus::Compromised | EntityStatus::Encrypted => Some(EntityStatus::Degraded),
        EntityStatus::Degraded | EntityStatus::Offline => Some(EntityStatus::Suspicious),
        EntityStatus::Online | EntityStatus::Suspicious => None,
    }
}

/// Mirrors a successful store write into the local snapshot.
fn apply_to_snapshot(
    snapshot: &mut BTreeMap<EntityId, Entity>,
    asset_id: &EntityId,
    status: EntityStatus,
    inject: &Inject,
    at: Timestamp,
) {
    if let Some(entity) = snapshot.get_mut(asset_id) {
        entity.status = status;
        entity.last_updated = at;
        entity.last_updated_by_inject = Some(inject.inject_id.clone());
    }
}

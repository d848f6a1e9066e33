// crates/msel-forge-core/src/core/entity.rs
// ============================================================================
// Module: MSEL Forge Infrastructure Entities
// Description: Simulated assets, their statuses, and typed relationships.
// Purpose: Model the knowledge graph the critic validates injects against.
// Dependencies: crate::core::{identifiers, time}, serde
// ============================================================================

//! ## Overview
//! Entities are the simulated infrastructure assets (servers, databases,
//! workstations) a scenario plays out against. Statuses form a severity
//! lattice used by the state updater: within a single inject a status is
//! never downgraded to a less severe one. Relationships are directed and
//! typed; one-hop outgoing traversal drives second-order cascade effects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::EntityId;
use crate::core::identifiers::InjectId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Entity Classification
// ============================================================================

/// Asset category within the simulated infrastructure.
///
/// # Invariants
/// - Variants are stable for serialization and seeding templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Physical or virtual server.
    Server,
    /// Database instance.
    Database,
    /// Network segment or appliance.
    Network,
    /// End-user workstation.
    Workstation,
    /// Business application.
    Application,
}

/// Business criticality tier for an asset.
///
/// # Invariants
/// - Variants are stable for serialization and seeding templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Loss halts a critical business function.
    Critical,
    /// Loss degrades a critical business function.
    High,
    /// Loss is absorbable within normal operations.
    Standard,
}

// ============================================================================
// SECTION: Entity Status
// ============================================================================

/// Operational status of an asset.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
/// - [`EntityStatus::severity_rank`] defines the update precedence lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// Healthy and reachable.
    Online,
    /// Behaving anomalously; under observation.
    Suspicious,
    /// Functionally impaired but reachable.
    Degraded,
    /// Confirmed under adversary control.
    Compromised,
    /// Unreachable or taken down.
    Offline,
    /// Data rendered inaccessible by ransomware.
    Encrypted,
}

impl EntityStatus {
    /// Returns the update precedence rank of this status.
    ///
    /// Higher ranks win when a single inject implies several target statuses,
    /// and a cascade never overwrites a dependent already at a higher rank.
    #[must_use]
    pub const fn severity_rank(self) -> u8 {
        match self {
            Self::Online => 0,
            Self::Suspicious => 1,
            Self::Offline => 2,
            Self::Degraded => 3,
            Self::Compromised => 4,
            Self::Encrypted => 5,
        }
    }

    /// Returns the wire label used in prompts and trace records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Suspicious => "suspicious",
            Self::Degraded => "degraded",
            Self::Compromised => "compromised",
            Self::Offline => "offline",
            Self::Encrypted => "encrypted",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// SECTION: Entity Record
// ============================================================================

/// One simulated infrastructure asset.
///
/// # Invariants
/// - `id` is unique within the state store.
/// - `last_updated_by_inject` names the inject that caused the last status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Asset identifier.
    pub id: EntityId,
    /// Asset category.
    pub entity_type: EntityType,
    /// Human-readable asset name.
    pub name: String,
    /// Current operational status.
    pub status: EntityStatus,
    /// Business criticality tier.
    pub criticality: Criticality,
    /// Timestamp of the last status write.
    pub last_updated: Timestamp,
    /// Inject that caused the last status write, if any.
    pub last_updated_by_inject: Option<InjectId>,
}

impl Entity {
    /// Creates a new online asset with no update attribution.
    #[must_use]
    pub fn seeded(
        id: impl Into<EntityId>,
        entity_type: EntityType,
        name: impl Into<String>,
        criticality: Criticality,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type,
            name: name.into(),
            status: EntityStatus::Online,
            criticality,
            last_updated: Timestamp::start(),
            last_updated_by_inject: None,
        }
    }
}

// ============================================================================
// SECTION: Relationships
// ============================================================================

/// Directed relationship label between two assets.
///
/// # Invariants
/// - Variants are stable for serialization and the graph store wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// Source workload runs on the target host.
    RunsOn,
    /// Source consumes the target service or data store.
    Uses,
    /// Source has a network path to the target.
    ConnectsTo,
    /// Source replicates data to the target.
    ReplicatesTo,
    /// Source shields the target (firewall, WAF).
    Protects,
    /// Source routes traffic to the target.
    RoutesTo,
    /// Source distributes content or updates to the target.
    DistributesTo,
    /// Source calls an API exposed by the target.
    Calls,
    /// Bidirectional peer link.
    PeerToPeer,
}

impl RelationshipType {
    /// Returns the wire label used by the graph store.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RunsOn => "RUNS_ON",
            Self::Uses => "USES",
            Self::ConnectsTo => "CONNECTS_TO",
            Self::ReplicatesTo => "REPLICATES_TO",
            Self::Protects => "PROTECTS",
            Self::RoutesTo => "ROUTES_TO",
            Self::DistributesTo => "DISTRIBUTES_TO",
            Self::Calls => "CALLS",
            Self::PeerToPeer => "PEER_TO_PEER",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Directed, typed edge between two assets.
///
/// # Invariants
/// - `source` and `target` must both exist in the state store when created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Source asset identifier.
    pub source: EntityId,
    /// Target asset identifier.
    pub target: EntityId,
    /// Relationship label.
    pub kind: RelationshipType,
}

impl Relationship {
    /// Creates a new directed relationship.
    #[must_use]
    pub fn new(
        source: impl Into<EntityId>,
        kind: RelationshipType,
        target: impl Into<EntityId>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
        }
    }
}

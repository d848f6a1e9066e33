// crates/msel-forge-core/src/runtime/state_store.rs
// ============================================================================
// Module: MSEL Forge State Store
// Description: Authoritative asset repository over a graph store backend.
// Purpose: Seed infrastructure templates and serve attributed status updates.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The state store is the durable, authoritative record of simulated assets,
//! their statuses, and their relationships. Seeding is an idempotent bulk
//! wipe-and-create; status writes always attribute the triggering inject.
//! Graph nodes whose ids carry `inject-` or `scenario-` prefixes are not
//! assets and are excluded from snapshots.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::Criticality;
use crate::core::Entity;
use crate::core::EntityId;
use crate::core::EntityStatus;
use crate::core::EntityType;
use crate::core::InjectId;
use crate::core::Relationship;
use crate::core::RelationshipType;
use crate::core::Timestamp;
use crate::interfaces::GraphStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Infrastructure Templates
// ============================================================================

/// Seeding template for the infrastructure graph.
///
/// # Invariants
/// - Templates are deterministic: the same template always seeds the same
///   entities and relationships.
#[derive(Debug, Clone, PartialEq)]
pub enum InfrastructureTemplate {
    /// Canonical enterprise estate: exactly 40 entities.
    Enterprise,
    /// Caller-provided entities and relationships.
    Custom {
        /// Entities to create.
        entities: Vec<Entity>,
        /// Relationships to create between them.
        relationships: Vec<Relationship>,
    },
}

impl InfrastructureTemplate {
    /// Materializes the template into entities and relationships.
    #[must_use]
    pub fn materialize(&self) -> (Vec<Entity>, Vec<Relationship>) {
        match self {
            Self::Enterprise => enterprise_estate(),
            Self::Custom {
                entities,
                relationships,
            } => (entities.clone(), relationships.clone()),
        }
    }
}

/// Builds the canonical enterprise estate (exactly 40 entities).
fn enterprise_estate() -> (Vec<Entity>, Vec<Relationship>) {
    let mut entities = Vec::with_capacity(40);
    for index in 1..=5u32 {
        entities.push(Entity::seeded(
            format!("SRV-CORE-{index:03}"),
            EntityType::Server,
            format!("Core Server {index}"),
            Criticality::Critical,
        ));
    }
    for index in 1..=15u32 {
        entities.push(Entity::seeded(
            format!("SRV-APP-{index:03}"),
            EntityType::Server,
            format!("Application Server {index}"),
            Criticality::High,
        ));
    }
    for index in 1..=5u32 {
        entities.push(Entity::seeded(
            format!("DB-PROD-{index:02}"),
            EntityType::Database,
            format!("Production Database {index}"),
            Criticality::Critical,
        ));
    }
    for index in 1..=5u32 {
        entities.push(Entity::seeded(
            format!("DB-DEV-{index:02}"),
            EntityType::Database,
            format!("Development Database {index}"),
            Criticality::Standard,
        ));
    }
    for index in 1..=10u32 {
        entities.push(Entity::seeded(
            format!("WS-FINANCE-{index:02}"),
            EntityType::Workstation,
            format!("Finance Workstation {index}"),
            Criticality::Standard,
        ));
    }

    let mut relationships = Vec::new();
    for index in 1..=5u32 {
        relationships.push(Relationship::new(
            format!("SRV-APP-{index:03}"),
            RelationshipType::RunsOn,
            format!("SRV-CORE-{index:03}"),
        ));
    }
    for index in 1..=2u32 {
        relationships.push(Relationship::new(
            format!("SRV-APP-{index:03}"),
            RelationshipType::Uses,
            format!("DB-PROD-{index:02}"),
        ));
    }
    relationships.push(Relationship::new("SRV-APP-003", RelationshipType::Uses, "DB-DEV-01"));
    relationships.push(Relationship::new(
        "WS-FINANCE-01",
        RelationshipType::ConnectsTo,
        "SRV-APP-001",
    ));
    relationships.push(Relationship::new(
        "WS-FINANCE-02",
        RelationshipType::ConnectsTo,
        "SRV-APP-002",
    ));
    relationships.push(Relationship::new("DB-PROD-01", RelationshipType::ReplicatesTo, "DB-PROD-02"));
    relationships.push(Relationship::new("SRV-CORE-001", RelationshipType::RoutesTo, "SRV-APP-001"));

    (entities, relationships)
}

// ============================================================================
// SECTION: State Store
// ============================================================================

/// Authoritative asset repository over a [`GraphStore`] backend.
///
/// # Invariants
/// - Reads reflect all prior successful writes within the same run.
/// - Snapshot keys never carry `inject-` or `scenario-` prefixes.
pub struct StateStore<G> {
    /// Backing graph store.
    graph: G,
}

impl<G: GraphStore> StateStore<G> {
    /// Creates a state store over the given graph backend.
    pub const fn new(graph: G) -> Self {
        Self {
            graph,
        }
    }

    /// Returns a reference to the backing graph store.
    pub const fn graph(&self) -> &G {
        &self.graph
    }

    /// Seeds the infrastructure graph from a template.
    ///
    /// The operation is an idempotent bulk wipe-and-create; repeating it with
    /// the same template produces an identical final state. Returns the
    /// number of entities created.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when any wipe or create statement fails.
    pub fn seed_infrastructure(
        &self,
        template: &InfrastructureTemplate,
    ) -> Result<usize, StoreError> {
        let (entities, relationships) = template.materialize();
        self.graph.wipe()?;
        for entity in &entities {
            self.graph.create_entity(entity)?;
        }
        for relationship in &relationships {
            self.graph.create_relationship(relationship)?;
        }
        Ok(entities.len())
    }

    /// Returns the current asset snapshot, optionally filtered by type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    pub fn get_current_state(
        &self,
        filter: Option<EntityType>,
    ) -> Result<BTreeMap<EntityId, Entity>, StoreError> {
        let mut snapshot = BTreeMap::new();
        for entity in self.graph.entities()? {
            if !is_asset_id(&entity.id) {
                continue;
            }
            if let Some(wanted) = filter
                && entity.entity_type != wanted
            {
                continue;
            }
            snapshot.insert(entity.id.clone(), entity);
        }
        Ok(snapshot)
    }

    /// Writes a status with inject attribution.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails or the entity is unknown.
    pub fn update_entity_status(
        &self,
        entity_id: &EntityId,
        new_status: EntityStatus,
        inject_id: Option<&InjectId>,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        self.graph.set_status(entity_id, new_status, inject_id, at)
    }

    /// Returns the current status of one asset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the asset is unknown and
    /// [`StoreError`] when the read fails.
    pub fn get_entity_status(&self, entity_id: &EntityId) -> Result<EntityStatus, StoreError> {
        self.graph
            .entity(entity_id)?
            .map(|entity| entity.status)
            .ok_or_else(|| StoreError::Invalid(format!("unknown entity: {entity_id}")))
    }

    /// Returns entities reachable via one outgoing relationship hop.
    ///
    /// Used for second-order cascade effects.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the traversal fails.
    pub fn get_affected_entities(&self, entity_id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        self.graph.neighbors_out(entity_id)
    }
}

/// Returns true when a graph node id names a real asset.
fn is_asset_id(id: &EntityId) -> bool {
    let id = id.as_str();
    !id.starts_with("inject-") && !id.starts_with("scenario-")
}

// ============================================================================
// SECTION: In-Memory Graph Store
// ============================================================================

/// Graph contents guarded by the in-memory store mutex.
#[derive(Debug, Default)]
struct GraphData {
    /// Entities keyed by id.
    entities: BTreeMap<String, Entity>,
    /// Directed relationships.
    relationships: Vec<Relationship>,
}

/// In-memory graph store for tests, demos, and offline exercise prep.
///
/// # Invariants
/// - Per-entity writes are serialized by the interior mutex.
#[derive(Debug, Default, Clone)]
pub struct InMemoryGraphStore {
    /// Graph contents protected by a mutex.
    data: Arc<Mutex<GraphData>>,
}

impl InMemoryGraphStore {
    /// Creates an empty in-memory graph store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(GraphData::default())),
        }
    }

    /// Locks the interior data, mapping poisoning to a store error.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, GraphData>, StoreError> {
        self.data.lock().map_err(|_| StoreError::Store("graph store mutex poisoned".to_string()))
    }
}

impl GraphStore for InMemoryGraphStore {
    fn wipe(&self) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.entities.clear();
        guard.relationships.clear();
        Ok(())
    }

    fn create_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        self.lock()?.entities.insert(entity.id.as_str().to_string(), entity.clone());
        Ok(())
    }

    fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        if !guard.entities.contains_key(relationship.source.as_str()) {
            return Err(StoreError::Statement(format!(
                "relationship source missing: {}",
                relationship.source
            )));
        }
        if !guard.entities.contains_key(relationship.target.as_str()) {
            return Err(StoreError::Statement(format!(
                "relationship target missing: {}",
                relationship.target
            )));
        }
        guard.relationships.push(relationship.clone());
        Ok(())
    }

    fn entities(&self) -> Result<Vec<Entity>, StoreError> {
        Ok(self.lock()?.entities.values().cloned().collect())
    }

    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        Ok(self.lock()?.entities.get(id.as_str()).cloned())
    }

    fn set_status(
        &self,
        id: &EntityId,
        status: EntityStatus,
        inject_id: Option<&InjectId>,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let Some(entity) = guard.entities.get_mut(id.as_str()) else {
            return Err(StoreError::Statement(format!("unknown entity: {id}")));
        };
        entity.status = status;
        entity.last_updated = at;
        entity.last_updated_by_inject = inject_id.cloned();
        Ok(())
    }

    fn neighbors_out(&self, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        let guard = self.lock()?;
        let mut out = Vec::new();
        for relationship in &guard.relationships {
            if relationship.source == *id
                && let Some(target) = guard.entities.get(relationship.target.as_str())
                && !out.contains(target)
            {
                out.push(target.clone());
            }
        }
        Ok(out)
    }
}

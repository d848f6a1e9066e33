// crates/msel-forge-cli/src/backends.rs
// ============================================================================
// Module: CLI Backend Selection
// Description: Config-driven concrete backends behind enum adapters.
// Purpose: Wire providers and stores into the generic engine at one site.
// Dependencies: msel-forge-config, msel-forge-core, msel-forge-providers,
// msel-forge-store-graph
// ============================================================================

//! ## Overview
//! The engine is generic over its backends; the CLI resolves configuration
//! into concrete implementations once, behind small delegating enums. An
//! empty graph URI (or `--offline`) selects the in-memory graph; an empty
//! vector path selects the curated-catalog-only intel path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use msel_forge_config::MselForgeConfig;
use msel_forge_core::Entity;
use msel_forge_core::EntityId;
use msel_forge_core::EntityStatus;
use msel_forge_core::GraphStore;
use msel_forge_core::InMemoryGraphStore;
use msel_forge_core::InjectId;
use msel_forge_core::IntelError;
use msel_forge_core::Relationship;
use msel_forge_core::StoreError;
use msel_forge_core::Timestamp;
use msel_forge_core::TtpHit;
use msel_forge_core::VectorStore;
use msel_forge_providers::FileTtpIndex;
use msel_forge_providers::HttpLanguageModel;
use msel_forge_providers::HttpLlmConfig;
use msel_forge_store_graph::CypherGraphStore;
use msel_forge_store_graph::CypherStoreConfig;

// ============================================================================
// SECTION: Graph Backend
// ============================================================================

/// Config-selected graph backend.
pub enum AnyGraph {
    /// In-memory graph for offline exercise prep and dry runs.
    Memory(InMemoryGraphStore),
    /// Durable Cypher HTTP backend.
    Cypher(CypherGraphStore),
}

impl GraphStore for AnyGraph {
    fn wipe(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.wipe(),
            Self::Cypher(store) => store.wipe(),
        }
    }

    fn create_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.create_entity(entity),
            Self::Cypher(store) => store.create_entity(entity),
        }
    }

    fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.create_relationship(relationship),
            Self::Cypher(store) => store.create_relationship(relationship),
        }
    }

    fn entities(&self) -> Result<Vec<Entity>, StoreError> {
        match self {
            Self::Memory(store) => store.entities(),
            Self::Cypher(store) => store.entities(),
        }
    }

    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        match self {
            Self::Memory(store) => store.entity(id),
            Self::Cypher(store) => store.entity(id),
        }
    }

    fn set_status(
        &self,
        id: &EntityId,
        status: EntityStatus,
        inject_id: Option<&InjectId>,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set_status(id, status, inject_id, at),
            Self::Cypher(store) => store.set_status(id, status, inject_id, at),
        }
    }

    fn neighbors_out(&self, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        match self {
            Self::Memory(store) => store.neighbors_out(id),
            Self::Cypher(store) => store.neighbors_out(id),
        }
    }

    fn readiness(&self) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.readiness(),
            Self::Cypher(store) => store.readiness(),
        }
    }
}

/// Builds the graph backend from configuration.
pub fn build_graph(config: &MselForgeConfig, offline: bool) -> Result<AnyGraph, String> {
    if offline || config.graph.uri.is_empty() {
        return Ok(AnyGraph::Memory(InMemoryGraphStore::new()));
    }
    let store = CypherGraphStore::new(CypherStoreConfig {
        uri: config.graph.uri.clone(),
        database: "neo4j".to_string(),
        user: config.graph.user.clone(),
        password: config.graph.password.clone(),
        timeout_ms: 10_000,
    })
    .map_err(|err| format!("graph backend unavailable: {err}"))?;
    Ok(AnyGraph::Cypher(store))
}

// ============================================================================
// SECTION: Intel Backend
// ============================================================================

/// Config-selected intel backend.
pub enum AnyVector {
    /// File-backed technique index.
    File(FileTtpIndex),
    /// No similarity backend; the curated catalog answers everything.
    None,
}

impl VectorStore for AnyVector {
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<TtpHit>, IntelError> {
        match self {
            Self::File(index) => index.similarity_search(query, k),
            Self::None => Ok(Vec::new()),
        }
    }
}

/// Builds the intel backend from configuration.
pub fn build_vector(config: &MselForgeConfig) -> Result<AnyVector, String> {
    if config.intel.vector_db_path.is_empty() {
        return Ok(AnyVector::None);
    }
    let index = FileTtpIndex::load(Path::new(&config.intel.vector_db_path))
        .map_err(|err| format!("ttp index unavailable: {err}"))?;
    Ok(AnyVector::File(index))
}

// ============================================================================
// SECTION: Model Backend
// ============================================================================

/// Builds the language-model backend from configuration.
pub fn build_model(config: &MselForgeConfig) -> Result<HttpLanguageModel, String> {
    let endpoint = config.llm.endpoint.clone();
    let allow_http = endpoint.starts_with("http://");
    HttpLanguageModel::new(HttpLlmConfig {
        endpoint,
        api_key: config.llm.api_key.clone(),
        model: config.llm.model.clone(),
        allow_http,
        timeout_ms: config.llm.timeout_ms,
        max_response_bytes: 1024 * 1024,
    })
    .map_err(|err| format!("language model unavailable: {err}"))
}

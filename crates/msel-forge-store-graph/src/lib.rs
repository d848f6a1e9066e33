// crates/msel-forge-store-graph/src/lib.rs
// ============================================================================
// Module: MSEL Forge Graph Store Library
// Description: Durable GraphStore over a Cypher HTTP transaction endpoint.
// Purpose: Persist the asset graph with the canonical seeding statements.
// Dependencies: msel-forge-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! This crate implements the core [`GraphStore`] interface against a
//! Neo4j-style HTTP transaction endpoint. Every operation maps 1:1 to the
//! canonical Cypher statements of the system design: `MATCH (n) DETACH
//! DELETE n` for wipes, `CREATE (e:Entity {...})` per asset, `MATCH` +
//! `CREATE` per relationship, and attributed `SET` writes for status
//! updates. Response mapping is strict and fail-closed: server-reported
//! errors and unmappable rows surface as [`StoreError`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::CypherGraphStore;
pub use store::CypherStoreConfig;

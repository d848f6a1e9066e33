// crates/msel-forge-store-graph/src/store.rs
// ============================================================================
// Module: Cypher Graph Store
// Description: GraphStore implementation over the HTTP transaction API.
// Purpose: Issue canonical Cypher statements with strict response mapping.
// Dependencies: msel-forge-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! Each [`GraphStore`] operation posts one auto-commit transaction to
//! `/db/{database}/tx/commit`. Timestamps and inject attribution are encoded
//! as string properties (graph properties are primitives). Requests carry
//! basic authentication when credentials are configured; redirects are never
//! followed and responses are size-capped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use msel_forge_core::Criticality;
use msel_forge_core::Entity;
use msel_forge_core::EntityId;
use msel_forge_core::EntityStatus;
use msel_forge_core::EntityType;
use msel_forge_core::GraphStore;
use msel_forge_core::InjectId;
use msel_forge_core::Relationship;
use msel_forge_core::StoreError;
use msel_forge_core::Timestamp;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Maximum transaction response size accepted from the server.
const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Configuration for the Cypher graph store.
///
/// # Invariants
/// - `uri` must carry an `http` or `https` scheme.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CypherStoreConfig {
    /// Base URI of the graph server (e.g. `http://localhost:7474`).
    pub uri: String,
    /// Database name addressed by the transaction endpoint.
    #[serde(default = "default_database")]
    pub database: String,
    /// Username for basic authentication (empty disables auth).
    #[serde(default)]
    pub user: String,
    /// Password for basic authentication.
    #[serde(default)]
    pub password: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Default database name.
fn default_database() -> String {
    "neo4j".to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    10_000
}

// ============================================================================
// SECTION: Response Shape
// ============================================================================

/// Transaction-commit response envelope.
#[derive(Debug, Deserialize)]
struct TxResponse {
    /// Per-statement results.
    #[serde(default)]
    results: Vec<TxResult>,
    /// Server-reported errors; non-empty means the transaction failed.
    #[serde(default)]
    errors: Vec<TxError>,
}

/// One statement result.
#[derive(Debug, Deserialize)]
struct TxResult {
    /// Row container list.
    #[serde(default)]
    data: Vec<TxRow>,
}

/// One row container.
#[derive(Debug, Deserialize)]
struct TxRow {
    /// Column values in statement order.
    #[serde(default)]
    row: Vec<Value>,
}

/// One server-reported error.
#[derive(Debug, Deserialize)]
struct TxError {
    /// Stable error code.
    #[serde(default)]
    code: String,
    /// Human-readable message.
    #[serde(default)]
    message: String,
}

// ============================================================================
// SECTION: Store Implementation
// ============================================================================

/// Durable graph store over the Cypher HTTP transaction endpoint.
pub struct CypherGraphStore {
    /// Store configuration.
    config: CypherStoreConfig,
    /// Resolved transaction-commit endpoint.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl CypherGraphStore {
    /// Creates a store over the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] when the URI is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: CypherStoreConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.uri)
            .map_err(|_| StoreError::Connection("invalid graph uri".to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(StoreError::Connection("unsupported graph uri scheme".to_string()));
        }
        let endpoint = base
            .join(&format!("db/{}/tx/commit", config.database))
            .map_err(|_| StoreError::Connection("invalid graph database name".to_string()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|_| StoreError::Connection("graph http client build failed".to_string()))?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Posts one auto-commit statement and returns its rows.
    fn run(&self, statement: &str, parameters: Value) -> Result<Vec<Vec<Value>>, StoreError> {
        let body = json!({
            "statements": [{"statement": statement, "parameters": parameters}],
        });
        let mut builder = self.client.post(self.endpoint.clone()).json(&body);
        if !self.config.user.is_empty() {
            builder = builder.basic_auth(&self.config.user, Some(&self.config.password));
        }
        let response = builder
            .send()
            .map_err(|err| StoreError::Connection(format!("graph request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Connection(format!("graph server returned {status}")));
        }

        let mut buf = Vec::new();
        let mut handle = response
            .take(u64::try_from(MAX_RESPONSE_BYTES).unwrap_or(u64::MAX).saturating_add(1));
        handle
            .read_to_end(&mut buf)
            .map_err(|err| StoreError::Connection(format!("graph response read failed: {err}")))?;
        if buf.len() > MAX_RESPONSE_BYTES {
            return Err(StoreError::Invalid("graph response exceeds size limit".to_string()));
        }
        let parsed: TxResponse = serde_json::from_slice(&buf)
            .map_err(|err| StoreError::Invalid(format!("graph response shape invalid: {err}")))?;
        if let Some(error) = parsed.errors.first() {
            return Err(StoreError::Statement(format!("{}: {}", error.code, error.message)));
        }
        Ok(parsed
            .results
            .into_iter()
            .next()
            .map(|result| result.data.into_iter().map(|row| row.row).collect())
            .unwrap_or_default())
    }
}

/// Columns returned for entity reads, in statement order.
const ENTITY_COLUMNS: &str =
    "e.id, e.type, e.name, e.status, e.criticality, e.last_updated, e.last_updated_by_inject";

impl GraphStore for CypherGraphStore {
    fn wipe(&self) -> Result<(), StoreError> {
        self.run("MATCH (n) DETACH DELETE n", json!({}))?;
        Ok(())
    }

    fn create_entity(&self, entity: &Entity) -> Result<(), StoreError> {
        self.run(
            "CREATE (e:Entity {id: $id, type: $type, name: $name, status: $status, \
             criticality: $criticality, last_updated: $last_updated, \
             last_updated_by_inject: $last_updated_by_inject})",
            json!({
                "id": entity.id,
                "type": type_label(entity.entity_type),
                "name": entity.name,
                "status": entity.status.label(),
                "criticality": criticality_label(entity.criticality),
                "last_updated": encode_timestamp(entity.last_updated),
                "last_updated_by_inject": entity.last_updated_by_inject,
            }),
        )?;
        Ok(())
    }

    fn create_relationship(&self, relationship: &Relationship) -> Result<(), StoreError> {
        // The relationship label comes from a closed enum; interpolation is
        // safe and the statement otherwise stays parameterized.
        let statement = format!(
            "MATCH (s {{id: $src}}), (t {{id: $tgt}}) CREATE (s)-[:{}]->(t) RETURN s.id",
            relationship.kind.label()
        );
        let rows = self.run(
            &statement,
            json!({
                "src": relationship.source,
                "tgt": relationship.target,
            }),
        )?;
        if rows.is_empty() {
            return Err(StoreError::Statement(format!(
                "relationship endpoints missing: {} -> {}",
                relationship.source, relationship.target
            )));
        }
        Ok(())
    }

    fn entities(&self) -> Result<Vec<Entity>, StoreError> {
        let rows = self.run(&format!("MATCH (e:Entity) RETURN {ENTITY_COLUMNS}"), json!({}))?;
        rows.iter().map(|row| decode_entity(row)).collect()
    }

    fn entity(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        let rows = self.run(
            &format!("MATCH (e:Entity {{id: $id}}) RETURN {ENTITY_COLUMNS}"),
            json!({"id": id}),
        )?;
        rows.first().map(|row| decode_entity(row)).transpose()
    }

    fn set_status(
        &self,
        id: &EntityId,
        status: EntityStatus,
        inject_id: Option<&InjectId>,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let rows = self.run(
            "MATCH (e {id: $id}) SET e.status = $status, e.last_updated = $now, \
             e.last_updated_by_inject = $inject RETURN e.id",
            json!({
                "id": id,
                "status": status.label(),
                "now": encode_timestamp(at),
                "inject": inject_id,
            }),
        )?;
        if rows.is_empty() {
            return Err(StoreError::Statement(format!("unknown entity: {id}")));
        }
        Ok(())
    }

    fn neighbors_out(&self, id: &EntityId) -> Result<Vec<Entity>, StoreError> {
        let rows = self.run(
            &format!(
                "MATCH (s {{id: $id}})-[]->(e:Entity) RETURN DISTINCT {ENTITY_COLUMNS}"
            ),
            json!({"id": id}),
        )?;
        rows.iter().map(|row| decode_entity(row)).collect()
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.run("RETURN 1", json!({}))?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Property Encoding
// ============================================================================

/// Wire label for an entity type property.
const fn type_label(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Server => "Server",
        EntityType::Database => "Database",
        EntityType::Network => "Network",
        EntityType::Workstation => "Workstation",
        EntityType::Application => "Application",
    }
}

/// Wire label for a criticality property.
const fn criticality_label(criticality: Criticality) -> &'static str {
    match criticality {
        Criticality::Critical => "critical",
        Criticality::High => "high",
        Criticality::Standard => "standard",
    }
}

/// Encodes a timestamp as a primitive string property.
fn encode_timestamp(timestamp: Timestamp) -> String {
    match timestamp {
        Timestamp::Wall(millis) => format!("wall:{millis}"),
        Timestamp::Tick(tick) => format!("tick:{tick}"),
    }
}

/// Decodes a timestamp property written by [`encode_timestamp`].
fn decode_timestamp(raw: &str) -> Option<Timestamp> {
    if let Some(millis) = raw.strip_prefix("wall:") {
        return millis.parse().ok().map(Timestamp::Wall);
    }
    if let Some(tick) = raw.strip_prefix("tick:") {
        return tick.parse().ok().map(Timestamp::Tick);
    }
    None
}

/// Decodes one entity row in [`ENTITY_COLUMNS`] order.
fn decode_entity(row: &[Value]) -> Result<Entity, StoreError> {
    let field = |index: usize| -> Result<&Value, StoreError> {
        row.get(index)
            .ok_or_else(|| StoreError::Invalid(format!("entity row missing column {index}")))
    };
    let text = |index: usize| -> Result<&str, StoreError> {
        field(index)?
            .as_str()
            .ok_or_else(|| StoreError::Invalid(format!("entity column {index} is not a string")))
    };

    let entity_type = match text(1)? {
        "Server" => EntityType::Server,
        "Database" => EntityType::Database,
        "Network" => EntityType::Network,
        "Workstation" => EntityType::Workstation,
        "Application" => EntityType::Application,
        other => return Err(StoreError::Invalid(format!("unknown entity type: {other}"))),
    };
    let status = match text(3)? {
        "online" => EntityStatus::Online,
        "suspicious" => EntityStatus::Suspicious,
        "degraded" => EntityStatus::Degraded,
        "compromised" => EntityStatus::Compromised,
        "offline" => EntityStatus::Offline,
        "encrypted" => EntityStatus::Encrypted,
        other => return Err(StoreError::Invalid(format!("unknown entity status: {other}"))),
    };
    let criticality = match text(4)? {
        "critical" => Criticality::Critical,
        "high" => Criticality::High,
        "standard" => Criticality::Standard,
        other => return Err(StoreError::Invalid(format!("unknown criticality: {other}"))),
    };
    let last_updated = decode_timestamp(text(5)?)
        .ok_or_else(|| StoreError::Invalid("unparseable last_updated property".to_string()))?;
    let last_updated_by_inject = match field(6)? {
        Value::Null => None,
        Value::String(raw) => Some(
            InjectId::parse(raw.clone())
                .map_err(|err| StoreError::Invalid(format!("bad inject attribution: {err}")))?,
        ),
        _ => return Err(StoreError::Invalid("bad inject attribution type".to_string())),
    };

    Ok(Entity {
        id: EntityId::new(text(0)?),
        entity_type,
        name: text(2)?.to_string(),
        status,
        criticality,
        last_updated,
        last_updated_by_inject,
    })
}

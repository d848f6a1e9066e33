// crates/msel-forge-core/src/core/trace.rs
// ============================================================================
// Module: MSEL Forge Forensic Trace
// Description: Append-only audit records for drafts, verdicts, and decisions.
// Purpose: Make every generation step reproducible from the trace alone.
// Dependencies: crate::core::{identifiers, time}, serde, thiserror
// ============================================================================

//! ## Overview
//! The forensic trace is a structural output of the engine: one record per
//! draft, critic verdict, refinement, state update, and decision. Records are
//! append-only and carry the exact inputs the critic received, so downstream
//! evaluation can reproduce each verdict from the trace alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::identifiers::InjectId;
use crate::core::identifiers::ScenarioId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Trace Records
// ============================================================================

/// Event kind for one trace record.
///
/// # Invariants
/// - Variants are stable for serialization and offline evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceEventKind {
    /// A draft inject was produced by the generator.
    Draft,
    /// The critic recorded a validation attempt.
    Critic,
    /// A rejected draft was sent back for refinement.
    Refined,
    /// An accepted inject was applied to system state.
    StateUpdate,
    /// A human decision was recorded.
    Decision,
}

/// One append-only forensic trace record.
///
/// # Invariants
/// - Records are never mutated after append.
/// - `details` carries the full structured payload for the event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Host-supplied record timestamp.
    pub timestamp: Timestamp,
    /// Event kind.
    pub event_type: TraceEventKind,
    /// Inject the event concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inject_id: Option<InjectId>,
    /// Owning scenario.
    pub scenario_id: ScenarioId,
    /// Short human-readable message.
    pub message: String,
    /// Full structured event payload.
    pub details: Value,
}

// ============================================================================
// SECTION: Trace Sink Interface
// ============================================================================

/// Trace sink errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Sink I/O failure.
    #[error("trace sink io error: {0}")]
    Io(String),
    /// Record serialization failure.
    #[error("trace record serialization error: {0}")]
    Serialize(String),
}

/// Append-only sink for forensic trace records.
pub trait TraceSink {
    /// Appends one record to the trace.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError`] when the record cannot be persisted.
    fn append(&self, record: &TraceRecord) -> Result<(), TraceError>;
}

// ============================================================================
// SECTION: JSON-Lines File Sink
// ============================================================================

/// Append-only JSON-lines trace sink backed by a file.
///
/// # Invariants
/// - One JSON object per line; the file is only ever appended to.
#[derive(Debug)]
pub struct JsonlTraceSink {
    /// Open append-mode file handle guarded for serialized writes.
    file: Mutex<File>,
}

impl JsonlTraceSink {
    /// Opens (or creates) the trace file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Io`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| TraceError::Io(err.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl TraceSink for JsonlTraceSink {
    fn append(&self, record: &TraceRecord) -> Result<(), TraceError> {
        let line =
            serde_json::to_string(record).map_err(|err| TraceError::Serialize(err.to_string()))?;
        let mut guard =
            self.file.lock().map_err(|_| TraceError::Io("trace sink mutex poisoned".to_string()))?;
        writeln!(guard, "{line}").map_err(|err| TraceError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: In-Memory Sink
// ============================================================================

/// In-memory trace sink for tests and log retrieval.
///
/// # Invariants
/// - Records are append-only; `snapshot` returns them in append order.
#[derive(Debug, Default, Clone)]
pub struct MemoryTraceSink {
    /// Appended records guarded for serialized writes.
    records: Arc<Mutex<Vec<TraceRecord>>>,
}

impl MemoryTraceSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a copy of all appended records in order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TraceRecord> {
        self.records.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl TraceSink for MemoryTraceSink {
    fn append(&self, record: &TraceRecord) -> Result<(), TraceError> {
        self.records
            .lock()
            .map_err(|_| TraceError::Io("trace sink mutex poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }
}

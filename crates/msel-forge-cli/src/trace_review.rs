// crates/msel-forge-cli/src/trace_review.rs
// ============================================================================
// Module: Forensic Trace Review
// Description: List/show/logs commands over the append-only trace file.
// Purpose: Make the forensic trace the offline source of truth for review.
// Dependencies: msel-forge-core, serde_json
// ============================================================================

//! ## Overview
//! Review commands operate on the JSON-lines trace file rather than any
//! in-process registry: the trace is the ground truth for what was generated.
//! `show` reconstructs the accepted timeline from state-update records;
//! `logs` prints every record for a scenario verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use msel_forge_core::Inject;
use msel_forge_core::TraceEventKind;
use msel_forge_core::TraceRecord;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Reads every trace record from a JSON-lines file.
fn read_records(path: &Path) -> Result<Vec<TraceRecord>, String> {
    let text = fs::read_to_string(path)
        .map_err(|err| format!("trace file unreadable ({}): {err}", path.display()))?;
    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: TraceRecord = serde_json::from_str(line)
            .map_err(|err| format!("trace line {} invalid: {err}", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Lists the distinct scenario identifiers recorded in the trace.
pub fn list(path: &Path) -> Result<(), String> {
    let records = read_records(path)?;
    let ids: BTreeSet<String> =
        records.iter().map(|record| record.scenario_id.to_string()).collect();
    let mut out = std::io::stdout();
    for id in ids {
        writeln!(out, "{id}").map_err(|err| err.to_string())?;
    }
    Ok(())
}

/// Shows the accepted timeline reconstructed from state-update records.
pub fn show(path: &Path, scenario_id: &str) -> Result<(), String> {
    let records = read_records(path)?;
    let mut out = std::io::stdout();
    let mut shown = 0usize;
    for record in records {
        if record.scenario_id.as_str() != scenario_id
            || record.event_type != TraceEventKind::StateUpdate
        {
            continue;
        }
        let Some(inject_value) = record.details.get("inject") else {
            continue;
        };
        let inject: Inject = serde_json::from_value(inject_value.clone())
            .map_err(|err| format!("trace carried an unreadable inject: {err}"))?;
        writeln!(
            out,
            "{} {} [{}] via {}: {}",
            inject.inject_id,
            inject.time_offset,
            inject.phase,
            inject.modality,
            inject.content
        )
        .map_err(|err| err.to_string())?;
        shown += 1;
    }
    if shown == 0 {
        return Err(format!("no accepted injects recorded for {scenario_id}"));
    }
    Ok(())
}

/// Prints every trace record for a scenario verbatim.
pub fn logs(path: &Path, scenario_id: &str) -> Result<(), String> {
    let records = read_records(path)?;
    let mut out = std::io::stdout();
    let mut shown = 0usize;
    for record in records {
        if record.scenario_id.as_str() != scenario_id {
            continue;
        }
        let rendered = serde_json::to_string(&record).map_err(|err| err.to_string())?;
        writeln!(out, "{rendered}").map_err(|err| err.to_string())?;
        shown += 1;
    }
    if shown == 0 {
        return Err(format!("no trace records for {scenario_id}"));
    }
    Ok(())
}

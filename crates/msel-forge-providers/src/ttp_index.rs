// crates/msel-forge-providers/src/ttp_index.rs
// ============================================================================
// Module: File-Backed TTP Index
// Description: Deterministic lexical similarity search over stored techniques.
// Purpose: Serve the VectorStore contract without an embedding backend.
// Dependencies: msel-forge-core, serde_json
// ============================================================================

//! ## Overview
//! The index loads technique records from a JSON-lines file (one [`Ttp`] per
//! line) and ranks them against a query by token overlap. Ranking is
//! deterministic: ties break on technique id, so identical inputs always
//! produce identical candidate lists. Malformed lines fail the load rather
//! than being skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use msel_forge_core::IntelError;
use msel_forge_core::Ttp;
use msel_forge_core::TtpHit;
use msel_forge_core::VectorStore;

// ============================================================================
// SECTION: Index
// ============================================================================

/// One indexed technique with its pre-computed token set.
#[derive(Debug, Clone)]
struct IndexedTtp {
    /// Technique record.
    ttp: Ttp,
    /// Lowercased alphanumeric tokens of name, tactic, and description.
    tokens: BTreeSet<String>,
}

/// File-backed technique index serving the [`VectorStore`] contract.
///
/// # Invariants
/// - Ranking is deterministic for identical inputs.
#[derive(Debug, Clone)]
pub struct FileTtpIndex {
    /// Indexed technique records.
    entries: Vec<IndexedTtp>,
}

impl FileTtpIndex {
    /// Loads a JSON-lines technique file (one record per line).
    ///
    /// # Errors
    ///
    /// Returns [`IntelError`] when the file is unreadable or any line fails
    /// to parse as a technique record.
    pub fn load(path: &Path) -> Result<Self, IntelError> {
        let text = fs::read_to_string(path)
            .map_err(|err| IntelError::Unavailable(format!("ttp index unreadable: {err}")))?;
        let mut entries = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let ttp: Ttp = serde_json::from_str(line).map_err(|err| {
                IntelError::Invalid(format!("ttp index line {} invalid: {err}", number + 1))
            })?;
            entries.push(IndexedTtp {
                tokens: record_tokens(&ttp),
                ttp,
            });
        }
        Ok(Self {
            entries,
        })
    }

    /// Builds an index directly from technique records.
    #[must_use]
    pub fn from_records(records: Vec<Ttp>) -> Self {
        let entries = records
            .into_iter()
            .map(|ttp| IndexedTtp {
                tokens: record_tokens(&ttp),
                ttp,
            })
            .collect();
        Self {
            entries,
        }
    }

    /// Returns the number of indexed techniques.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the index holds no techniques.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VectorStore for FileTtpIndex {
    fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<TtpHit>, IntelError> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(f64, &IndexedTtp)> = self
            .entries
            .iter()
            .map(|entry| (overlap_score(&query_tokens, &entry.tokens), entry))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|(score_a, entry_a), (score_b, entry_b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| entry_a.ttp.id.cmp(&entry_b.ttp.id))
        });
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, entry)| TtpHit {
                ttp: entry.ttp.clone(),
                score,
            })
            .collect())
    }
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Tokenizes text into lowercased alphanumeric words.
fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|token| token.len() > 2)
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Token set for one technique record.
fn record_tokens(ttp: &Ttp) -> BTreeSet<String> {
    let mut tokens = tokenize(&ttp.name);
    tokens.extend(tokenize(&ttp.tactic));
    tokens.extend(tokenize(&ttp.description));
    tokens
}

/// Fraction of query tokens found in the record's token set.
fn overlap_score(query: &BTreeSet<String>, record: &BTreeSet<String>) -> f64 {
    let matched = query.intersection(record).count();
    #[allow(clippy::cast_precision_loss, reason = "Token counts stay far below 2^52.")]
    let fraction = matched as f64 / query.len() as f64;
    fraction
}

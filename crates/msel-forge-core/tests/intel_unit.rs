// crates/msel-forge-core/tests/intel_unit.rs
// ============================================================================
// Module: Intel Provider Unit Tests
// Description: Vector-store ranking and curated fallback behavior.
// Purpose: Ensure technique retrieval never stalls generation.
// ============================================================================

//! Intel provider tests with scripted and failing vector stores.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use msel_forge_core::CrisisPhase;
use msel_forge_core::IntelError;
use msel_forge_core::IntelProvider;
use msel_forge_core::ScenarioType;
use msel_forge_core::Ttp;
use msel_forge_core::TtpHit;
use msel_forge_core::VectorStore;
use msel_forge_core::runtime::curated_ttps;
use msel_forge_core::runtime::phase_query;

struct ScriptedVectorStore {
    hits: Vec<TtpHit>,
}

impl VectorStore for ScriptedVectorStore {
    fn similarity_search(&self, _query: &str, k: usize) -> Result<Vec<TtpHit>, IntelError> {
        Ok(self.hits.iter().take(k).cloned().collect())
    }
}

struct DownVectorStore;

impl VectorStore for DownVectorStore {
    fn similarity_search(&self, _query: &str, _k: usize) -> Result<Vec<TtpHit>, IntelError> {
        Err(IntelError::Unavailable("vector store offline".to_string()))
    }
}

#[test]
fn vector_hits_are_used_when_available() {
    let hit = TtpHit {
        ttp: Ttp::new("T1566", "Phishing", "initial-access", "Spearphishing delivery."),
        score: 0.91,
    };
    let provider = IntelProvider::new(ScriptedVectorStore {
        hits: vec![hit.clone()],
    });
    let selection = provider.get_ttps(
        ScenarioType::RansomwareDoubleExtortion,
        CrisisPhase::SuspiciousActivity,
        3,
    );
    assert!(!selection.used_fallback);
    assert_eq!(selection.ttps, vec![hit.ttp]);
}

#[test]
fn failing_vector_store_falls_back_to_the_curated_catalog() {
    let provider = IntelProvider::new(DownVectorStore);
    let selection = provider.get_ttps(
        ScenarioType::RansomwareDoubleExtortion,
        CrisisPhase::EscalationCrisis,
        5,
    );
    assert!(selection.used_fallback);
    assert!(!selection.ttps.is_empty());
    assert!(selection.ttps.iter().any(|ttp| ttp.id.as_str() == "T1486"));
}

#[test]
fn empty_vector_results_also_fall_back() {
    let provider = IntelProvider::new(ScriptedVectorStore {
        hits: Vec::new(),
    });
    let selection = provider.get_ttps(
        ScenarioType::DdosCriticalFunctions,
        CrisisPhase::InitialIncident,
        4,
    );
    assert!(selection.used_fallback);
    assert!(!selection.ttps.is_empty());
}

#[test]
fn curated_catalog_is_deterministic_and_deduplicated() {
    for phase in CrisisPhase::ALL {
        for scenario_type in [
            ScenarioType::RansomwareDoubleExtortion,
            ScenarioType::DdosCriticalFunctions,
            ScenarioType::SupplyChainCompromise,
            ScenarioType::InsiderThreatDataManipulation,
        ] {
            let first = curated_ttps(scenario_type, phase);
            let second = curated_ttps(scenario_type, phase);
            assert_eq!(first, second, "catalog must be deterministic");
            assert!(!first.is_empty(), "catalog must cover {phase}");
            for (index, ttp) in first.iter().enumerate() {
                assert!(
                    !first[index + 1..].iter().any(|other| other.id == ttp.id),
                    "duplicate technique {} for {phase}",
                    ttp.id
                );
            }
        }
    }
}

#[test]
fn phase_query_names_phase_and_scenario() {
    let query = phase_query(ScenarioType::SupplyChainCompromise, CrisisPhase::Containment);
    assert!(query.contains("CONTAINMENT"));
    assert!(query.contains("supplier"));
}

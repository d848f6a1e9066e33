// crates/msel-forge-config/tests/boundary_validation.rs
// ============================================================================
// Module: Config Boundary Validation Tests
// Description: Value-range and override validation for parsed configs.
// Purpose: Ensure invalid values are fatal at startup, never at run time.
// ============================================================================

//! Config value validation and environment-override tests.

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

use std::collections::BTreeMap;

use msel_forge_config::MselForgeConfig;

fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(key, value)| ((*key).to_string(), (*value).to_string())).collect()
}

#[test]
fn env_overrides_take_precedence_over_defaults() {
    let config = MselForgeConfig::load_with_env(
        None,
        &env(&[
            ("LLM_API_KEY", "sk-test"),
            ("LLM_MODEL", "exercise-model"),
            ("GRAPH_URI", "http://graph:7474"),
            ("GRAPH_USER", "neo4j"),
            ("GRAPH_PASSWORD", "secret"),
            ("VECTOR_DB_PATH", "/var/lib/ttp-index.jsonl"),
            ("FORENSIC_LOG_PATH", "/var/log/forensic.jsonl"),
            ("DEFAULT_MAX_ITERATIONS", "12"),
        ]),
    )
    .unwrap();

    assert_eq!(config.llm.api_key, "sk-test");
    assert_eq!(config.llm.model, "exercise-model");
    assert_eq!(config.graph.uri, "http://graph:7474");
    assert_eq!(config.graph.user, "neo4j");
    assert_eq!(config.graph.password, "secret");
    assert_eq!(config.intel.vector_db_path, "/var/lib/ttp-index.jsonl");
    assert_eq!(config.trace.forensic_log_path.to_string_lossy(), "/var/log/forensic.jsonl");
    assert_eq!(config.engine.default_max_iterations, 12);
}

#[test]
fn zero_iteration_budget_is_rejected() {
    let result = MselForgeConfig::load_with_env(None, &env(&[("DEFAULT_MAX_ITERATIONS", "0")]));
    assert!(result.is_err());
}

#[test]
fn oversized_iteration_budget_is_rejected() {
    let result = MselForgeConfig::load_with_env(None, &env(&[("DEFAULT_MAX_ITERATIONS", "101")]));
    assert!(result.is_err());
}

#[test]
fn non_numeric_iteration_budget_is_rejected() {
    let result = MselForgeConfig::load_with_env(None, &env(&[("DEFAULT_MAX_ITERATIONS", "ten")]));
    assert!(result.is_err());
}

#[test]
fn graph_uri_without_scheme_is_rejected() {
    let result = MselForgeConfig::load_with_env(None, &env(&[("GRAPH_URI", "localhost:7474")]));
    assert!(result.is_err());
}

#[test]
fn empty_model_is_rejected() {
    let result = MselForgeConfig::load_with_env(None, &env(&[("LLM_MODEL", "  ")]));
    assert!(result.is_err());
}

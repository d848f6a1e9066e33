// crates/msel-forge-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// ============================================================================

//! Config load validation tests for msel-forge-config.

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
use std::io::Write;
use std::path::Path;

use msel_forge_config::ConfigError;
use msel_forge_config::MselForgeConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<MselForgeConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn no_env() -> BTreeMap<String, String> {
    BTreeMap::new()
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(
        MselForgeConfig::load_with_env(Some(path), &no_env()),
        "config path exceeds max length",
    )?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(
        MselForgeConfig::load_with_env(Some(path), &no_env()),
        "config path component too long",
    )?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'a'; 1_048_577];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(
        MselForgeConfig::load_with_env(Some(file.path()), &no_env()),
        "config file exceeds size limit",
    )?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(
        MselForgeConfig::load_with_env(Some(file.path()), &no_env()),
        "config file must be utf-8",
    )?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(b"[llm\nmodel = ").map_err(|err| err.to_string())?;
    assert_invalid(
        MselForgeConfig::load_with_env(Some(file.path()), &no_env()),
        "config parse error",
    )?;
    Ok(())
}

#[test]
fn missing_path_yields_defaults() -> TestResult {
    let config =
        MselForgeConfig::load_with_env(None, &no_env()).map_err(|err| err.to_string())?;
    if config.engine.default_max_iterations != 10 {
        return Err("default inject budget must be 10".to_string());
    }
    if config.llm.timeout_ms != 60_000 {
        return Err("default llm timeout must be 60s".to_string());
    }
    Ok(())
}

#[test]
fn file_values_are_parsed() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(
        b"[llm]\nmodel = \"local-test\"\n\n[graph]\nuri = \"http://localhost:7474\"\n\n[engine]\ndefault_max_iterations = 5\n",
    )
    .map_err(|err| err.to_string())?;
    let config = MselForgeConfig::load_with_env(Some(file.path()), &no_env())
        .map_err(|err| err.to_string())?;
    if config.llm.model != "local-test" || config.engine.default_max_iterations != 5 {
        return Err("file values must override defaults".to_string());
    }
    Ok(())
}

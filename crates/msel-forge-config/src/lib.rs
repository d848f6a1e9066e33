// crates/msel-forge-config/src/lib.rs
// ============================================================================
// Module: MSEL Forge Configuration
// Description: Canonical configuration model, loading, and validation.
// Purpose: Provide strict, fail-closed configuration for all surfaces.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is a TOML document overlaid with environment variables.
//! Loading is strict and fail-closed: oversized files, non-UTF-8 content,
//! and overlong paths are rejected before parsing. A [`ConfigError`] is
//! fatal at startup; no run begins with invalid configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum configuration file size accepted by the loader.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for the inject budget.
const MAX_ITERATIONS_CEILING: u32 = 100;

/// Environment variables recognized as overrides, in documentation order.
pub const ENV_OVERRIDES: [&str; 8] = [
    "LLM_API_KEY",
    "LLM_MODEL",
    "GRAPH_URI",
    "GRAPH_USER",
    "GRAPH_PASSWORD",
    "VECTOR_DB_PATH",
    "FORENSIC_LOG_PATH",
    "DEFAULT_MAX_ITERATIONS",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors, fatal at startup.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config path exceeds the total length limit.
    #[error("config path exceeds max length")]
    PathTooLong,
    /// A config path component exceeds the component limit.
    #[error("config path component too long")]
    PathComponentTooLong,
    /// Config file could not be read.
    #[error("config file unreadable: {0}")]
    Unreadable(String),
    /// Config file exceeds the size limit.
    #[error("config file exceeds size limit")]
    TooLarge,
    /// Config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// Config file failed to parse as TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A configuration value failed validation.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Sections
// ============================================================================

/// Language-model backend settings.
///
/// # Invariants
/// - `model` is non-empty after validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmConfig {
    /// API key for the backend (empty means anonymous/local).
    #[serde(default)]
    pub api_key: String,
    /// Model identifier requested from the backend.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Endpoint URL for the chat-completions API.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// Per-call timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

/// Default model identifier.
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default chat-completions endpoint.
fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

/// Default per-call timeout.
const fn default_llm_timeout_ms() -> u64 {
    60_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

/// Graph database settings.
///
/// # Invariants
/// - `uri` carries a scheme after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphConfig {
    /// Connection URI (e.g. `http://localhost:7474`); empty selects the
    /// in-memory store.
    #[serde(default)]
    pub uri: String,
    /// Username for basic authentication.
    #[serde(default)]
    pub user: String,
    /// Password for basic authentication.
    #[serde(default)]
    pub password: String,
}

/// Intel retrieval settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IntelConfig {
    /// Path to the technique index; empty selects the curated catalog only.
    #[serde(default)]
    pub vector_db_path: String,
}

/// Forensic trace settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TraceConfig {
    /// Path of the append-only JSON-lines trace file.
    #[serde(default = "default_forensic_log_path")]
    pub forensic_log_path: PathBuf,
}

/// Default forensic log path.
fn default_forensic_log_path() -> PathBuf {
    PathBuf::from("forensic_log.jsonl")
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            forensic_log_path: default_forensic_log_path(),
        }
    }
}

/// Engine defaults.
///
/// # Invariants
/// - `default_max_iterations` is within `1..=100` after validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Default inject budget per run.
    #[serde(default = "default_max_iterations")]
    pub default_max_iterations: u32,
}

/// Default inject budget.
const fn default_max_iterations() -> u32 {
    10
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: default_max_iterations(),
        }
    }
}

// ============================================================================
// SECTION: Configuration Root
// ============================================================================

/// Canonical MSEL Forge configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MselForgeConfig {
    /// Language-model backend settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Graph database settings.
    #[serde(default)]
    pub graph: GraphConfig,
    /// Intel retrieval settings.
    #[serde(default)]
    pub intel: IntelConfig,
    /// Forensic trace settings.
    #[serde(default)]
    pub trace: TraceConfig,
    /// Engine defaults.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl MselForgeConfig {
    /// Loads configuration from an optional file plus process environment.
    ///
    /// A missing path yields defaults overlaid with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on any load-guard, parse, or validation
    /// failure; all configuration errors are fatal at startup.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env: BTreeMap<String, String> = ENV_OVERRIDES
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| ((*name).to_string(), value)))
            .collect();
        Self::load_with_env(path, &env)
    }

    /// Loads configuration from an optional file plus explicit overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on any load-guard, parse, or validation
    /// failure.
    pub fn load_with_env(
        path: Option<&Path>,
        env: &BTreeMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses one configuration file with strict guards.
    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        check_path(path)?;
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Unreadable(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::TooLarge);
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Unreadable(err.to_string()))?;
        if u64::try_from(bytes.len()).unwrap_or(u64::MAX) > MAX_CONFIG_BYTES {
            return Err(ConfigError::TooLarge);
        }
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies recognized environment overrides onto the parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override fails to parse.
    pub fn apply_env_overrides(
        &mut self,
        env: &BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = env.get("LLM_API_KEY") {
            self.llm.api_key.clone_from(value);
        }
        if let Some(value) = env.get("LLM_MODEL") {
            self.llm.model.clone_from(value);
        }
        if let Some(value) = env.get("GRAPH_URI") {
            self.graph.uri.clone_from(value);
        }
        if let Some(value) = env.get("GRAPH_USER") {
            self.graph.user.clone_from(value);
        }
        if let Some(value) = env.get("GRAPH_PASSWORD") {
            self.graph.password.clone_from(value);
        }
        if let Some(value) = env.get("VECTOR_DB_PATH") {
            self.intel.vector_db_path.clone_from(value);
        }
        if let Some(value) = env.get("FORENSIC_LOG_PATH") {
            self.trace.forensic_log_path = PathBuf::from(value);
        }
        if let Some(value) = env.get("DEFAULT_MAX_ITERATIONS") {
            self.engine.default_max_iterations = value.parse().map_err(|_| {
                ConfigError::Invalid(format!("DEFAULT_MAX_ITERATIONS is not a number: {value}"))
            })?;
        }
        Ok(())
    }

    /// Validates cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must be non-empty".to_string()));
        }
        if self.llm.timeout_ms == 0 {
            return Err(ConfigError::Invalid("llm.timeout_ms must be positive".to_string()));
        }
        if !self.llm.endpoint.contains("://") {
            return Err(ConfigError::Invalid("llm.endpoint must carry a scheme".to_string()));
        }
        if !self.graph.uri.is_empty() && !self.graph.uri.contains("://") {
            return Err(ConfigError::Invalid("graph.uri must carry a scheme".to_string()));
        }
        if self.engine.default_max_iterations == 0
            || self.engine.default_max_iterations > MAX_ITERATIONS_CEILING
        {
            return Err(ConfigError::Invalid(format!(
                "engine.default_max_iterations must be within 1..={MAX_ITERATIONS_CEILING}"
            )));
        }
        check_path(&self.trace.forensic_log_path)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Path Guards
// ============================================================================

/// Enforces path length limits before any filesystem access.
fn check_path(path: &Path) -> Result<(), ConfigError> {
    let rendered = path.to_string_lossy();
    if rendered.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::PathTooLong);
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::PathComponentTooLong);
        }
    }
    Ok(())
}

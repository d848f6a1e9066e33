// crates/msel-forge-providers/src/lib.rs
// ============================================================================
// Module: MSEL Forge Providers Library
// Description: Reference backend implementations of the core interfaces.
// Purpose: Provide the HTTP language model and the file-backed TTP index.
// Dependencies: msel-forge-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! Providers implement the core's backend-agnostic interfaces with real
//! transports: a bounded, fail-closed HTTP client for chat-completions
//! language models and a deterministic file-backed technique index serving
//! the vector-store contract. Both are synchronous; the engine's run model
//! is single-threaded cooperative.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod llm;
pub mod ttp_index;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use llm::HttpLanguageModel;
pub use llm::HttpLlmConfig;
pub use ttp_index::FileTtpIndex;

// crates/msel-forge-providers/src/llm.rs
// ============================================================================
// Module: HTTP Language Model Provider
// Description: Bounded chat-completions client for the LanguageModel trait.
// Purpose: Invoke remote models with strict limits and fail-closed mapping.
// Dependencies: msel-forge-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The HTTP provider posts a single-user-message chat request and returns
//! the first choice's content. It enforces scheme restrictions, disables
//! redirects, caps response sizes, and applies a per-call timeout. Transport
//! and shape failures map to [`LlmError`]; the agent layer owns the single
//! transient retry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use msel_forge_core::LanguageModel;
use msel_forge_core::LlmError;
use msel_forge_core::LlmRequest;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde_json::json;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP language-model provider.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `max_response_bytes` is enforced as a hard upper bound on bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpLlmConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Bearer token; empty sends no authorization header.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for HttpLlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            allow_http: false,
            timeout_ms: 60_000,
            max_response_bytes: 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Response Shape
// ============================================================================

/// Minimal chat-completions response shape.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Returned choices; only the first is consumed.
    choices: Vec<ChatChoice>,
}

/// One returned choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The assistant message for this choice.
    message: ChatMessage,
}

/// The assistant message payload.
#[derive(Debug, Deserialize)]
struct ChatMessage {
    /// Completion text.
    content: String,
}

// ============================================================================
// SECTION: Provider Implementation
// ============================================================================

/// Chat-completions language model over bounded blocking HTTP.
///
/// # Invariants
/// - Redirects are not followed.
/// - Responses exceeding configured limits fail closed.
#[derive(Debug)]
pub struct HttpLanguageModel {
    /// Provider configuration, including limits and policy.
    config: HttpLlmConfig,
    /// Validated endpoint URL.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpLanguageModel {
    /// Creates a new provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Unavailable`] when the endpoint violates policy or
    /// the HTTP client cannot be created.
    pub fn new(config: HttpLlmConfig) -> Result<Self, LlmError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|_| LlmError::Unavailable("invalid llm endpoint url".to_string()))?;
        match endpoint.scheme() {
            "https" => {}
            "http" if config.allow_http => {}
            _ => return Err(LlmError::Unavailable("unsupported llm endpoint scheme".to_string())),
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|_| LlmError::Unavailable("llm http client build failed".to_string()))?;
        Ok(Self {
            config,
            endpoint,
            client,
        })
    }

    /// Reads the response body while enforcing the byte limit.
    fn read_limited(&self, response: reqwest::blocking::Response) -> Result<Vec<u8>, LlmError> {
        let limit = self.config.max_response_bytes;
        let mut buf = Vec::new();
        let mut handle = response.take(u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1));
        handle
            .read_to_end(&mut buf)
            .map_err(|err| LlmError::Unavailable(format!("llm response read failed: {err}")))?;
        if buf.len() > limit {
            return Err(LlmError::Malformed("llm response exceeds size limit".to_string()));
        }
        Ok(buf)
    }
}

impl LanguageModel for HttpLanguageModel {
    fn invoke(&self, request: &LlmRequest) -> Result<String, LlmError> {
        let model = request.model_hint.as_deref().unwrap_or(self.config.model.as_str());
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": request.prompt}],
        });

        let mut builder = self.client.post(self.endpoint.clone()).json(&body);
        if !self.config.api_key.is_empty() {
            builder = builder.bearer_auth(&self.config.api_key);
        }
        let response = builder
            .send()
            .map_err(|err| LlmError::Unavailable(format!("llm request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Unavailable(format!("llm backend returned {status}")));
        }

        let bytes = self.read_limited(response)?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|err| LlmError::Malformed(format!("llm response shape invalid: {err}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed("llm response carried no choices".to_string()))
    }
}

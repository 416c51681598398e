//! Blocking HTTP backend for a messages-style completion API.
//!
//! Request body:
//!   `{model, system, max_tokens, temperature, messages: [{role: "user", content}]}`
//! Response envelope:
//!   `{content: [{type: "text", text}, ...], ...}`; text blocks are concatenated.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use medguard_contracts::{
    error::{MedguardError, MedguardResult},
    oracle::OracleRequest,
};
use medguard_core::traits::TextOracle;

use crate::config::OracleConfig;

/// Service error bodies are cut to this many characters before being
/// carried in an error.
const MAX_ERROR_BODY: usize = 512;

/// A `TextOracle` backed by a remote completion service.
pub struct MessagesOracle {
    http: Client,
    config: OracleConfig,
    api_key: String,
}

impl MessagesOracle {
    /// Build a backend from `config`, reading the API key from the environment.
    ///
    /// Returns `MedguardError::ConfigError` when the key is missing or the
    /// HTTP client cannot be constructed.
    pub fn from_config(config: OracleConfig) -> MedguardResult<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a backend with an explicit API key.
    pub fn with_api_key(config: OracleConfig, api_key: impl Into<String>) -> MedguardResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MedguardError::ConfigError {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

impl TextOracle for MessagesOracle {
    fn complete(&self, request: &OracleRequest) -> MedguardResult<String> {
        let body = request_body(&self.config.model, request);

        debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            max_tokens = request.max_tokens,
            "sending oracle request"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .map_err(|e| MedguardError::OracleTransport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().map_err(|e| MedguardError::OracleTransport {
            reason: format!("failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "oracle service returned an error status");
            return Err(MedguardError::OracleService {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let envelope: Value = serde_json::from_str(&text).map_err(|e| MedguardError::OracleResponse {
            reason: format!("response envelope is not JSON: {}", e),
        })?;
        envelope_text(&envelope)
    }
}

/// Build the JSON request body for `request`.
pub fn request_body(model: &str, request: &OracleRequest) -> Value {
    json!({
        "model": model,
        "system": request.system,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": [
            { "role": "user", "content": request.prompt }
        ]
    })
}

/// Concatenate every `text` block of a response envelope.
///
/// An envelope with no text blocks is `MedguardError::OracleResponse`; the
/// *content* of the text is not inspected here.
pub fn envelope_text(envelope: &Value) -> MedguardResult<String> {
    let blocks = envelope
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| MedguardError::OracleResponse {
            reason: "response envelope has no content array".to_string(),
        })?;

    let texts: Vec<&str> = blocks
        .iter()
        .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|b| b.get("text").and_then(Value::as_str))
        .collect();

    if texts.is_empty() {
        return Err(MedguardError::OracleResponse {
            reason: "response envelope has no text block".to_string(),
        });
    }
    Ok(texts.concat())
}

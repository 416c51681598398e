//! Oracle connection settings loaded from TOML.
//!
//! The API key is never stored in the file; `api_key_env` names the
//! environment variable that holds it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use medguard_contracts::error::{MedguardError, MedguardResult};

/// Connection settings for a messages-style completion service.
///
/// Every field has a default, so an empty TOML document is valid.
///
/// ```toml
/// model = "claude-3-5-haiku-latest"
/// api_key_env = "ARYA_API_KEY"
/// max_tokens = 500
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Full URL of the messages endpoint.
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Value sent in the `anthropic-version` header.
    pub api_version: String,
    /// Response-length cap applied to both artifact prompts.
    pub max_tokens: u32,
    /// Whole-request deadline. Expiry is reported as a transport failure.
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            api_key_env: "ARYA_API_KEY".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 500,
            timeout_secs: 30,
        }
    }
}

impl OracleConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `MedguardError::ConfigError` if the TOML is malformed or has
    /// fields of the wrong type.
    pub fn from_toml_str(s: &str) -> MedguardResult<Self> {
        toml::from_str(s).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to parse oracle TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as oracle configuration.
    pub fn from_file(path: &Path) -> MedguardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to read oracle config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> MedguardResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(MedguardError::ConfigError {
                reason: format!("environment variable '{}' is not set", self.api_key_env),
            }),
        }
    }
}

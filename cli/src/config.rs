//! Combined configuration file for the `filter` command.
//!
//! Every section is optional:
//!
//! ```toml
//! [oracle]
//! model = "claude-3-5-haiku-latest"
//! timeout_secs = 20
//!
//! [filter]
//! on_oracle_failure = "propagate"
//! concurrent_oracle_calls = false
//!
//! [[rules]]
//! id = "pediatric-influenza-aspirin"
//! description = "Aspirin in children with influenza"
//! condition = "influenza"
//! medications = ["aspirin"]
//! max_age = 19
//! reason = "Reye's syndrome risk in children with influenza"
//! ```

use std::path::Path;

use serde::Deserialize;

use medguard_contracts::error::{MedguardError, MedguardResult};
use medguard_core::FilterSettings;
use medguard_oracle::OracleConfig;
use medguard_policy::{GuardRule, SafetyRuleEngine};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MedguardConfig {
    pub oracle: OracleConfig,
    pub filter: FilterSettings,
    /// Guard rules appended after the built-in ones.
    pub rules: Vec<GuardRule>,
}

impl MedguardConfig {
    pub fn from_toml_str(s: &str) -> MedguardResult<Self> {
        toml::from_str(s).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to parse medguard TOML: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> MedguardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to read medguard config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rule engine with the built-in rules plus `self.rules`.
    pub fn rule_engine(&self) -> MedguardResult<SafetyRuleEngine> {
        SafetyRuleEngine::with_rules(self.rules.clone())
    }
}

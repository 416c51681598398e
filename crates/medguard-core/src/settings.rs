//! Orchestrator settings.

use serde::{Deserialize, Serialize};

/// What to do when an oracle call fails outright (transport or service error).
///
/// Malformed oracle *content* is always recovered by the builders and is not
/// governed by this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleFailurePolicy {
    /// Substitute the empty artifact and continue.
    #[default]
    FailSoft,
    /// Return the error and abandon the run.
    Propagate,
}

/// Tunables for `MedicationFilter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub on_oracle_failure: OracleFailurePolicy,
    /// Issue the risk-map and dose oracle calls on separate threads.
    pub concurrent_oracle_calls: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            on_oracle_failure: OracleFailurePolicy::FailSoft,
            concurrent_oracle_calls: true,
        }
    }
}

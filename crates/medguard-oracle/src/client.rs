//! The knowledge client shared by both artifact builders.

use std::sync::Arc;

use tracing::debug;

use medguard_contracts::{error::MedguardResult, oracle::OracleRequest};
use medguard_core::traits::TextOracle;

/// Sends constrained prompts to a `TextOracle` with sampling pinned to zero.
///
/// Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct KnowledgeClient {
    oracle: Arc<dyn TextOracle>,
}

impl KnowledgeClient {
    /// The lowest-variance setting; never exposed as a knob.
    pub const TEMPERATURE: f32 = 0.0;

    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Ask the oracle and return its whitespace-trimmed completion.
    ///
    /// One outbound call, no retries. Transport and service failures are
    /// returned unchanged for the caller's failure policy to handle.
    pub fn query(&self, system: &str, prompt: &str, max_tokens: u32) -> MedguardResult<String> {
        let request = OracleRequest {
            system: system.to_string(),
            prompt: prompt.to_string(),
            max_tokens,
            temperature: Self::TEMPERATURE,
        };

        let raw = self.oracle.complete(&request)?;
        let text = raw.trim();

        debug!(
            prompt_chars = prompt.len(),
            response_chars = text.len(),
            "oracle query complete"
        );

        Ok(text.to_string())
    }
}

impl std::fmt::Debug for KnowledgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeClient").finish_non_exhaustive()
    }
}

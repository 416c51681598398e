//! A deterministic, in-process `TextOracle`.
//!
//! Answers each request with the response of the first script entry whose
//! marker occurs in the prompt. Used by tests and the reference scenarios
//! to exercise the builders without a network.

use std::sync::Mutex;

use medguard_contracts::{
    error::{MedguardError, MedguardResult},
    oracle::OracleRequest,
};
use medguard_core::traits::TextOracle;

/// What a script entry does when its marker matches.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this text as the completion.
    Text(String),
    /// Fail as if the service were unreachable.
    Unreachable,
}

/// A scripted oracle that records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Vec<(String, ScriptedReply)>,
    fallback: Option<ScriptedReply>,
    requests: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer prompts containing `marker` with `text`.
    pub fn reply(mut self, marker: impl Into<String>, text: impl Into<String>) -> Self {
        self.script
            .push((marker.into(), ScriptedReply::Text(text.into())));
        self
    }

    /// Fail prompts containing `marker` with a transport error.
    pub fn unreachable(mut self, marker: impl Into<String>) -> Self {
        self.script.push((marker.into(), ScriptedReply::Unreachable));
        self
    }

    /// Reply used when no marker matches. Without one, unmatched prompts
    /// fail with a transport error.
    pub fn otherwise(mut self, reply: ScriptedReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Copies of every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl TextOracle for ScriptedOracle {
    fn complete(&self, request: &OracleRequest) -> MedguardResult<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }

        let reply = self
            .script
            .iter()
            .find(|(marker, _)| request.prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply)
            .or(self.fallback.as_ref());

        match reply {
            Some(ScriptedReply::Text(text)) => Ok(text.clone()),
            Some(ScriptedReply::Unreachable) | None => Err(MedguardError::OracleTransport {
                reason: "scripted oracle has no reachable reply for this prompt".to_string(),
            }),
        }
    }
}

//! Request type for the external knowledge oracle.

use serde::{Deserialize, Serialize};

/// One text-completion request.
///
/// `temperature` is carried explicitly so backends cannot fall back to a
/// sampling default; the knowledge client always sets it to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRequest {
    /// System instruction framing the oracle's role.
    pub system: String,
    /// User prompt embedding the patient record and candidate list.
    pub prompt: String,
    /// Response-length cap in tokens.
    pub max_tokens: u32,
    pub temperature: f32,
}

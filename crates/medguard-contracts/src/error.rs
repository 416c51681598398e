//! Error types for the medguard filter.
//!
//! Malformed oracle *content* is never an error: builders resolve it to an
//! empty artifact. Errors here are reserved for transport, configuration,
//! and audit failures, plus requests that cannot be decoded at all.

use thiserror::Error;

/// The unified error type for the medguard crates.
#[derive(Debug, Error)]
pub enum MedguardError {
    /// The oracle could not be reached (connection refused, DNS, deadline expiry).
    #[error("oracle transport failed: {reason}")]
    OracleTransport { reason: String },

    /// The oracle answered with a non-success status.
    #[error("oracle service returned status {status}: {body}")]
    OracleService { status: u16, body: String },

    /// The oracle answered successfully but the response envelope carried no text.
    #[error("oracle response unusable: {reason}")]
    OracleResponse { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The audit sink could not append a filter record.
    ///
    /// Fatal for the run: a decision that cannot be audited is not returned.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The request document could not be decoded into a filter request.
    #[error("invalid filter request: {reason}")]
    InvalidRequest { reason: String },
}

impl MedguardError {
    /// True for failures that originate at the oracle boundary.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            MedguardError::OracleTransport { .. }
                | MedguardError::OracleService { .. }
                | MedguardError::OracleResponse { .. }
        )
    }
}

/// Convenience alias used throughout the medguard crates.
pub type MedguardResult<T> = Result<T, MedguardError>;

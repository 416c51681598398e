//! Core trait definitions for the medguard filter.
//!
//! These traits are the seams between the orchestrator and its collaborators:
//!
//! - `TextOracle`        - untrusted text generator (an LLM service or a stub)
//! - `RiskMapBuilder`    - turns a patient record into a risk map
//! - `DoseLookupBuilder` - turns a patient record into a dose lookup
//! - `SafetyEvaluator`   - trusted, pure rule evaluation per candidate
//! - `AuditWriter`       - trusted sink recording every completed run
//!
//! The orchestrator never depends on a concrete oracle, so any completion
//! backend (including a deterministic one for tests) can be substituted.

use medguard_contracts::{
    decision::{Artifact, FilterRecord},
    dose::DoseLookup,
    error::MedguardResult,
    oracle::OracleRequest,
    patient::PatientRecord,
    risk::RiskMap,
};

/// A text-completion service treated as a black box.
///
/// Implementations return the raw completion text. Transport and service
/// failures are returned as `MedguardError::Oracle*` variants; whether they
/// fail the run is decided by the orchestrator's failure policy.
pub trait TextOracle: Send + Sync {
    fn complete(&self, request: &OracleRequest) -> MedguardResult<String>;
}

/// Produces the risk map for one request.
///
/// Unusable oracle text must resolve to an empty map tagged
/// `ArtifactSource::Unparseable`, never to an error.
pub trait RiskMapBuilder: Send + Sync {
    fn build(&self, patient: &PatientRecord) -> MedguardResult<Artifact<RiskMap>>;
}

/// Produces the dose lookup for one request.
///
/// Same failure contract as `RiskMapBuilder`.
pub trait DoseLookupBuilder: Send + Sync {
    fn build(&self, patient: &PatientRecord) -> MedguardResult<Artifact<DoseLookup>>;
}

/// Pure safety-rule evaluation for a single candidate.
///
/// Implementations must be deterministic and side-effect free. An empty
/// return value means no rule flagged the medication.
pub trait SafetyEvaluator: Send + Sync {
    /// Every applicable reason, in rule order.
    fn evaluate(&self, patient: &PatientRecord, medication: &str, map: &RiskMap) -> Vec<String>;
}

/// The append-only record of filter runs.
///
/// A failed write is fatal for the run: the orchestrator returns the error
/// instead of an unaudited result.
pub trait AuditWriter: Send + Sync {
    fn write(&self, record: &FilterRecord) -> MedguardResult<()>;
}

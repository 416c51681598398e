//! The wire-level filter request.
//!
//! Upstream stages may attach previously built artifacts under
//! `agent2_med_maps` and `agent2_dose_dict`. Inside the crate those become
//! an explicit `Precomputed` argument instead of extra record fields.

use serde::{Deserialize, Serialize};

use crate::{
    dose::DoseLookup,
    error::{MedguardError, MedguardResult},
    patient::PatientRecord,
    risk::RiskMap,
};

/// Artifacts the caller already has. `Some` fields are used verbatim and the
/// corresponding oracle call is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precomputed {
    pub risk_map: Option<RiskMap>,
    pub dose_lookup: Option<DoseLookup>,
}

impl Precomputed {
    /// Nothing precomputed; both artifacts will be generated.
    pub fn none() -> Self {
        Self::default()
    }
}

/// A patient record plus optional precomputed artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(flatten)]
    pub patient: PatientRecord,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent2_med_maps: Option<RiskMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent2_dose_dict: Option<DoseLookup>,
}

impl FilterRequest {
    /// Decode a request from JSON text.
    ///
    /// Missing or `null` patient fields default; only a document that is not
    /// a request object at all is rejected.
    pub fn from_json_str(s: &str) -> MedguardResult<Self> {
        serde_json::from_str(s).map_err(|e| MedguardError::InvalidRequest {
            reason: format!("failed to decode request JSON: {}", e),
        })
    }

    /// Split into the patient record and the explicit precomputed artifacts.
    pub fn into_parts(self) -> (PatientRecord, Precomputed) {
        (
            self.patient,
            Precomputed {
                risk_map: self.agent2_med_maps,
                dose_lookup: self.agent2_dose_dict,
            },
        )
    }
}

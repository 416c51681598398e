//! Per-medication decisions, filter results, and audit records.
//!
//! `FilterResult` is what callers receive. `FilterReport` adds provenance of
//! the two knowledge artifacts. `FilterRecord` is what gets written to the
//! audit log, one per run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patient::{ExecutionId, PatientRecord};

/// An approved candidate with its standard dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedMedication {
    pub med: String,
    /// `"N/A"` when the dose lookup has no entry.
    pub dosage: String,
    /// `"N/A"` when the dose lookup has no entry.
    pub frequency: String,
}

/// A rejected candidate with every reason that applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnapprovedMedication {
    pub med: String,
    /// Human-readable reasons in rule order. Never empty.
    pub reasons: Vec<String>,
}

/// The outcome for one candidate medication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Approved(ApprovedMedication),
    Unapproved(UnapprovedMedication),
}

impl Decision {
    /// The medication this decision is about.
    pub fn medication(&self) -> &str {
        match self {
            Decision::Approved(a) => &a.med,
            Decision::Unapproved(u) => &u.med,
        }
    }
}

/// The approved/unapproved split for one request.
///
/// Every candidate appears in exactly one partition. Within each partition
/// candidates keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterResult {
    #[serde(rename = "approved_meds")]
    pub approved: Vec<ApprovedMedication>,
    #[serde(rename = "unapproved_meds")]
    pub unapproved: Vec<UnapprovedMedication>,
}

impl FilterResult {
    /// Partition decisions, preserving their order within each side.
    pub fn from_decisions(decisions: impl IntoIterator<Item = Decision>) -> Self {
        let mut result = Self::default();
        for decision in decisions {
            match decision {
                Decision::Approved(a) => result.approved.push(a),
                Decision::Unapproved(u) => result.unapproved.push(u),
            }
        }
        result
    }

    /// Total number of classified candidates.
    pub fn len(&self) -> usize {
        self.approved.len() + self.unapproved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a knowledge artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactSource {
    /// Supplied by the caller and reused verbatim.
    Precomputed,
    /// Decoded from a well-formed oracle response.
    Generated,
    /// The oracle answered but the text was not a valid artifact; empty default used.
    Unparseable,
    /// The oracle call failed; empty default used.
    OracleUnavailable,
}

impl ArtifactSource {
    /// True when the artifact is a fail-soft empty default.
    pub fn is_fallback(self) -> bool {
        matches!(self, ArtifactSource::Unparseable | ArtifactSource::OracleUnavailable)
    }
}

impl std::fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ArtifactSource::Precomputed => "precomputed",
            ArtifactSource::Generated => "generated",
            ArtifactSource::Unparseable => "unparseable",
            ArtifactSource::OracleUnavailable => "oracle-unavailable",
        };
        f.write_str(label)
    }
}

/// A knowledge artifact tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<T> {
    pub value: T,
    pub source: ArtifactSource,
}

impl<T> Artifact<T> {
    pub fn new(value: T, source: ArtifactSource) -> Self {
        Self { value, source }
    }
}

impl<T: Default> Artifact<T> {
    /// The empty default for `source`.
    pub fn fallback(source: ArtifactSource) -> Self {
        Self { value: T::default(), source }
    }
}

/// A filter result together with the provenance of the artifacts behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub execution_id: ExecutionId,
    pub risk_map_source: ArtifactSource,
    pub dose_source: ArtifactSource,
    pub result: FilterResult,
}

impl FilterReport {
    /// True when either artifact is a fail-soft default.
    ///
    /// A degraded run is still a valid answer, but only the guard rules
    /// (or only unknown doses) stand behind it.
    pub fn degraded(&self) -> bool {
        self.risk_map_source.is_fallback() || self.dose_source.is_fallback()
    }
}

/// An immutable record of one filter run, written to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRecord {
    pub execution_id: ExecutionId,
    /// The patient record exactly as the filter saw it.
    pub patient: PatientRecord,
    pub risk_map_source: ArtifactSource,
    pub dose_source: ArtifactSource,
    pub result: FilterResult,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl FilterRecord {
    /// Build the audit record for `report` over `patient`, stamped now.
    pub fn from_report(patient: &PatientRecord, report: &FilterReport) -> Self {
        Self {
            execution_id: report.execution_id.clone(),
            patient: patient.clone(),
            risk_map_source: report.risk_map_source,
            dose_source: report.dose_source,
            result: report.result.clone(),
            timestamp: Utc::now(),
        }
    }
}

//! Dose-lookup generation from the knowledge oracle.

use serde_json::Value;
use tracing::{debug, warn};

use medguard_contracts::{
    decision::{Artifact, ArtifactSource},
    dose::{DoseEntry, DoseLookup},
    error::MedguardResult,
    patient::PatientRecord,
};
use medguard_core::traits::DoseLookupBuilder;
use medguard_oracle::KnowledgeClient;

use crate::{
    prompts::{dose_prompt, DEFAULT_MAX_TOKENS, DOSE_SYSTEM},
    schema::{dose_schema, shape_violations},
};

/// Builds a `DoseLookup` by asking the oracle.
#[derive(Debug, Clone)]
pub struct OracleDoseLookupBuilder {
    client: KnowledgeClient,
    max_tokens: u32,
}

impl OracleDoseLookupBuilder {
    pub fn new(client: KnowledgeClient) -> Self {
        Self {
            client,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl DoseLookupBuilder for OracleDoseLookupBuilder {
    fn build(&self, patient: &PatientRecord) -> MedguardResult<Artifact<DoseLookup>> {
        let prompt = dose_prompt(patient);
        let raw = self.client.query(DOSE_SYSTEM, &prompt, self.max_tokens)?;

        let artifact = parse_dose_lookup(&raw);
        debug!(source = %artifact.source, entries = artifact.value.len(), "dose lookup built");
        Ok(artifact)
    }
}

/// Strictly decode oracle text as a `{"medication_doses": [...]}` document.
///
/// - not JSON, or not an object with an array (or `null`) under
///   `medication_doses` → empty lookup tagged `Unparseable`
/// - `medication_doses` missing → empty lookup tagged `Generated`
/// - entries without a usable `med` name are dropped
/// - missing dosage/frequency become `"N/A"`
/// - keys are lower-cased names; later duplicates replace earlier ones
pub fn parse_dose_lookup(raw: &str) -> Artifact<DoseLookup> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "dose response is not valid JSON; using empty lookup");
            return Artifact::fallback(ArtifactSource::Unparseable);
        }
    };

    let violations = shape_violations(&dose_schema(), &value);
    if !violations.is_empty() {
        for violation in &violations {
            warn!(%violation, "dose response has the wrong shape");
        }
        return Artifact::fallback(ArtifactSource::Unparseable);
    }

    let items = value
        .get("medication_doses")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let total = items.len();
    let entries: Vec<DoseEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<DoseEntry>(item).ok())
        .filter(|entry| !entry.medication.trim().is_empty())
        .collect();

    let dropped = total - entries.len();
    if dropped > 0 {
        debug!(dropped, "dose entries without a medication name were dropped");
    }

    Artifact::new(DoseLookup::from_entries(entries), ArtifactSource::Generated)
}

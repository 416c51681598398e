//! Risk-map generation from the knowledge oracle.

use serde_json::Value;
use tracing::{debug, warn};

use medguard_contracts::{
    decision::{Artifact, ArtifactSource},
    error::MedguardResult,
    patient::PatientRecord,
    risk::RiskMap,
};
use medguard_core::traits::RiskMapBuilder;
use medguard_oracle::KnowledgeClient;

use crate::{
    prompts::{risk_map_prompt, DEFAULT_MAX_TOKENS, RISK_MAP_SYSTEM},
    schema::{risk_map_schema, shape_violations},
};

/// Builds a `RiskMap` by asking the oracle.
#[derive(Debug, Clone)]
pub struct OracleRiskMapBuilder {
    client: KnowledgeClient,
    max_tokens: u32,
}

impl OracleRiskMapBuilder {
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

impl RiskMapBuilder for OracleRiskMapBuilder {
    /// Query the oracle and decode its answer.
    ///
    /// Unusable text yields an empty map tagged `Unparseable`. Medication
    /// names outside the candidate list are removed from a generated map.
    /// Only oracle transport and service failures are returned as errors.
    fn build(&self, patient: &PatientRecord) -> MedguardResult<Artifact<RiskMap>> {
        let prompt = risk_map_prompt(patient);
        let raw = self.client.query(RISK_MAP_SYSTEM, &prompt, self.max_tokens)?;

        let mut artifact = parse_risk_map(&raw);
        if artifact.source == ArtifactSource::Generated {
            let removed = artifact.value.retain_candidates(&patient.suggested_meds);
            if removed > 0 {
                warn!(removed, "risk map named medications outside the candidate list");
            }
        }

        debug!(source = %artifact.source, empty = artifact.value.is_empty(), "risk map built");
        Ok(artifact)
    }
}

/// Strictly decode oracle text as a `RiskMap`.
///
/// Missing or `null` top-level fields become empty. Anything else that is
/// not exactly a risk-map object resolves to the empty map tagged
/// `ArtifactSource::Unparseable`.
pub fn parse_risk_map(raw: &str) -> Artifact<RiskMap> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "risk map response is not valid JSON; using empty map");
            return Artifact::fallback(ArtifactSource::Unparseable);
        }
    };

    let violations = shape_violations(&risk_map_schema(), &value);
    if !violations.is_empty() {
        for violation in &violations {
            warn!(%violation, "risk map response has the wrong shape");
        }
        return Artifact::fallback(ArtifactSource::Unparseable);
    }

    match serde_json::from_value::<RiskMap>(value) {
        Ok(map) => Artifact::new(map, ArtifactSource::Generated),
        Err(e) => {
            warn!(error = %e, "risk map response could not be decoded; using empty map");
            Artifact::fallback(ArtifactSource::Unparseable)
        }
    }
}

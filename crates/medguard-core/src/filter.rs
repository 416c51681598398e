//! The filter orchestrator: the per-request decision pipeline.
//!
//! Each call to `run()` follows the same order:
//!
//!   Artifacts (risk map ∥ dose lookup) → Evaluate each candidate → Partition → Audit
//!
//! Both artifacts are resolved exactly once per request, independent of the
//! number of candidates. A caller-supplied artifact is used verbatim and its
//! builder is never invoked.

use std::thread;

use tracing::{debug, info, warn};

use medguard_contracts::{
    decision::{
        ApprovedMedication, Artifact, ArtifactSource, Decision, FilterRecord, FilterReport,
        FilterResult, UnapprovedMedication,
    },
    dose::DoseLookup,
    error::MedguardResult,
    patient::{ExecutionId, PatientRecord},
    request::Precomputed,
    risk::{lists_medication, RiskMap},
};

use crate::{
    settings::{FilterSettings, OracleFailurePolicy},
    traits::{AuditWriter, DoseLookupBuilder, RiskMapBuilder, SafetyEvaluator},
};

/// Classifies candidate medications as approved (with dose) or unapproved
/// (with reasons).
///
/// Holds no per-request state; one filter can serve any number of requests.
pub struct MedicationFilter {
    risk_builder: Box<dyn RiskMapBuilder>,
    dose_builder: Box<dyn DoseLookupBuilder>,
    evaluator: Box<dyn SafetyEvaluator>,
    audit: Box<dyn AuditWriter>,
    settings: FilterSettings,
}

impl MedicationFilter {
    /// Create a filter with default settings.
    pub fn new(
        risk_builder: Box<dyn RiskMapBuilder>,
        dose_builder: Box<dyn DoseLookupBuilder>,
        evaluator: Box<dyn SafetyEvaluator>,
        audit: Box<dyn AuditWriter>,
    ) -> Self {
        Self {
            risk_builder,
            dose_builder,
            evaluator,
            audit,
            settings: FilterSettings::default(),
        }
    }

    /// Replace the settings.
    pub fn with_settings(mut self, settings: FilterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Classify every candidate in `patient.suggested_meds`.
    ///
    /// Shorthand for `run()` when the caller does not need provenance.
    pub fn filter(
        &self,
        patient: &PatientRecord,
        precomputed: Precomputed,
    ) -> MedguardResult<FilterResult> {
        Ok(self.run(patient, precomputed)?.result)
    }

    /// Classify every candidate and report where each artifact came from.
    ///
    /// # Pipeline
    ///
    /// 1. Resolve the risk map and dose lookup (precomputed, or built; the two
    ///    builds run concurrently when `concurrent_oracle_calls` is set)
    /// 2. Apply the oracle failure policy to any builder error
    /// 3. Evaluate each candidate in input order
    /// 4. Unapproved if any reason applies, otherwise approved with the
    ///    looked-up dose (`"N/A"` when absent)
    /// 5. Write one `FilterRecord` to the audit log
    ///
    /// # Errors
    ///
    /// Oracle failures under `OracleFailurePolicy::Propagate`, non-oracle
    /// builder errors, and audit write failures. Data-shape problems in the
    /// patient record or the oracle's output never produce an error.
    pub fn run(
        &self,
        patient: &PatientRecord,
        precomputed: Precomputed,
    ) -> MedguardResult<FilterReport> {
        let execution_id = ExecutionId::new();

        info!(
            execution_id = %execution_id,
            candidates = patient.suggested_meds.len(),
            precomputed_risk_map = precomputed.risk_map.is_some(),
            precomputed_doses = precomputed.dose_lookup.is_some(),
            "medication filter starting"
        );

        // ── Step 1 & 2: Knowledge artifacts ──────────────────────────────────
        let (risk, doses) = self.resolve_artifacts(patient, precomputed)?;

        if risk.source.is_fallback() || doses.source.is_fallback() {
            warn!(
                execution_id = %execution_id,
                risk_map_source = %risk.source,
                dose_source = %doses.source,
                "filter running in degraded mode on fail-soft artifacts"
            );
        }

        // ── Step 3 & 4: Per-candidate decisions ──────────────────────────────
        let decisions = patient
            .suggested_meds
            .iter()
            .map(|medication| self.decide(patient, medication, &risk.value, &doses.value));
        let result = FilterResult::from_decisions(decisions);

        let report = FilterReport {
            execution_id,
            risk_map_source: risk.source,
            dose_source: doses.source,
            result,
        };

        // ── Step 5: Audit ────────────────────────────────────────────────────
        self.audit.write(&FilterRecord::from_report(patient, &report))?;

        info!(
            execution_id = %report.execution_id,
            approved = report.result.approved.len(),
            unapproved = report.result.unapproved.len(),
            degraded = report.degraded(),
            "medication filter complete"
        );

        Ok(report)
    }

    fn decide(
        &self,
        patient: &PatientRecord,
        medication: &str,
        risk: &RiskMap,
        doses: &DoseLookup,
    ) -> Decision {
        let reasons = self.evaluator.evaluate(patient, medication, risk);

        debug!(medication = %medication, reasons = reasons.len(), "candidate evaluated");

        if reasons.is_empty() {
            let (dosage, frequency) = doses.dose_for(medication);
            Decision::Approved(ApprovedMedication {
                med: medication.to_string(),
                dosage,
                frequency,
            })
        } else {
            Decision::Unapproved(UnapprovedMedication {
                med: medication.to_string(),
                reasons,
            })
        }
    }

    fn resolve_artifacts(
        &self,
        patient: &PatientRecord,
        precomputed: Precomputed,
    ) -> MedguardResult<(Artifact<RiskMap>, Artifact<DoseLookup>)> {
        let Precomputed { risk_map, dose_lookup } = precomputed;

        if let Some(map) = &risk_map {
            inspect_precomputed_risk_map(map, &patient.suggested_meds);
        }
        if let Some(lookup) = &dose_lookup {
            inspect_precomputed_doses(lookup, &patient.suggested_meds);
        }

        let (risk, doses) = match (risk_map, dose_lookup) {
            (Some(map), Some(lookup)) => (
                Ok(Artifact::new(map, ArtifactSource::Precomputed)),
                Ok(Artifact::new(lookup, ArtifactSource::Precomputed)),
            ),
            (Some(map), None) => (
                Ok(Artifact::new(map, ArtifactSource::Precomputed)),
                self.dose_builder.build(patient),
            ),
            (None, Some(lookup)) => (
                self.risk_builder.build(patient),
                Ok(Artifact::new(lookup, ArtifactSource::Precomputed)),
            ),
            (None, None) if self.settings.concurrent_oracle_calls => {
                thread::scope(|scope| {
                    let risk_handle = scope.spawn(|| self.risk_builder.build(patient));
                    let doses = self.dose_builder.build(patient);
                    let risk = risk_handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
                    (risk, doses)
                })
            }
            (None, None) => (
                self.risk_builder.build(patient),
                self.dose_builder.build(patient),
            ),
        };

        Ok((self.settle(risk, "risk map")?, self.settle(doses, "dose lookup")?))
    }

    /// Apply the oracle failure policy to a builder outcome.
    fn settle<T: Default>(
        &self,
        outcome: MedguardResult<Artifact<T>>,
        label: &str,
    ) -> MedguardResult<Artifact<T>> {
        match outcome {
            Ok(artifact) => Ok(artifact),
            Err(e)
                if e.is_oracle_failure()
                    && self.settings.on_oracle_failure == OracleFailurePolicy::FailSoft =>
            {
                warn!(artifact = %label, error = %e, "oracle call failed, using empty artifact");
                Ok(Artifact::fallback(ArtifactSource::OracleUnavailable))
            }
            Err(e) => Err(e),
        }
    }
}

/// A precomputed risk map is reused as-is even when it names medications
/// that are no longer candidates.
fn inspect_precomputed_risk_map(map: &RiskMap, candidates: &[String]) {
    let foreign = map
        .medications()
        .filter(|med| !lists_medication(candidates, med))
        .count();
    if foreign > 0 {
        debug!(foreign, "precomputed risk map names medications outside the candidate list");
    }
}

/// A precomputed dose lookup is reused as-is; candidates it does not cover
/// will be approved with unknown dose.
fn inspect_precomputed_doses(lookup: &DoseLookup, candidates: &[String]) {
    let uncovered: Vec<&str> = candidates
        .iter()
        .filter(|c| lookup.get(c).is_none())
        .map(String::as_str)
        .collect();
    if !uncovered.is_empty() {
        warn!(
            uncovered = ?uncovered,
            "precomputed dose lookup does not cover every candidate"
        );
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use medguard_contracts::{
        decision::{Artifact, ArtifactSource, FilterRecord},
        dose::{DoseEntry, DoseLookup},
        error::{MedguardError, MedguardResult},
        patient::PatientRecord,
        request::Precomputed,
        risk::{lists_medication, RiskMap},
    };

    use crate::{
        settings::{FilterSettings, OracleFailurePolicy},
        traits::{AuditWriter, DoseLookupBuilder, RiskMapBuilder, SafetyEvaluator},
    };

    use super::MedicationFilter;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn patient(meds: &[&str]) -> PatientRecord {
        PatientRecord {
            allergies: vec!["penicillin".to_string()],
            suggested_meds: meds.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    fn penicillin_map() -> RiskMap {
        let mut map = RiskMap::default();
        map.allergy_map
            .insert("penicillin".to_string(), vec!["amoxicillin".to_string()]);
        map
    }

    fn doses() -> DoseLookup {
        DoseLookup::from_entries(vec![DoseEntry {
            medication: "Cetirizine".to_string(),
            dosage: "10 mg".to_string(),
            frequency: "once daily".to_string(),
        }])
    }

    /// What a mock builder does when called.
    #[derive(Clone)]
    enum Behaviour<T> {
        Return(Artifact<T>),
        Fail,
    }

    /// A risk-map builder that counts calls and returns a canned outcome.
    struct MockRiskBuilder {
        calls: Arc<Mutex<u32>>,
        behaviour: Behaviour<RiskMap>,
    }

    impl RiskMapBuilder for MockRiskBuilder {
        fn build(&self, _patient: &PatientRecord) -> MedguardResult<Artifact<RiskMap>> {
            *self.calls.lock().unwrap() += 1;
            match &self.behaviour {
                Behaviour::Return(a) => Ok(a.clone()),
                Behaviour::Fail => Err(MedguardError::OracleTransport {
                    reason: "connection refused".to_string(),
                }),
            }
        }
    }

    /// A dose builder that counts calls and returns a canned outcome.
    struct MockDoseBuilder {
        calls: Arc<Mutex<u32>>,
        behaviour: Behaviour<DoseLookup>,
    }

    impl DoseLookupBuilder for MockDoseBuilder {
        fn build(&self, _patient: &PatientRecord) -> MedguardResult<Artifact<DoseLookup>> {
            *self.calls.lock().unwrap() += 1;
            match &self.behaviour {
                Behaviour::Return(a) => Ok(a.clone()),
                Behaviour::Fail => Err(MedguardError::OracleService {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
            }
        }
    }

    /// Flags any medication listed under any allergy the patient has.
    struct AllergyOnlyEvaluator;

    impl SafetyEvaluator for AllergyOnlyEvaluator {
        fn evaluate(&self, patient: &PatientRecord, medication: &str, map: &RiskMap) -> Vec<String> {
            map.allergy_map
                .iter()
                .filter(|(allergy, meds)| {
                    patient.has_allergy(allergy) && lists_medication(meds, medication)
                })
                .map(|(allergy, _)| format!("Patient is allergic to {}", allergy))
                .collect()
        }
    }

    /// An audit writer that records every call, optionally failing.
    struct MockAudit {
        records: Arc<Mutex<Vec<FilterRecord>>>,
        fail: bool,
    }

    impl AuditWriter for MockAudit {
        fn write(&self, record: &FilterRecord) -> MedguardResult<()> {
            if self.fail {
                return Err(MedguardError::AuditWriteFailed {
                    reason: "disk full".to_string(),
                });
            }
            self.records.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct Harness {
        filter: MedicationFilter,
        risk_calls: Arc<Mutex<u32>>,
        dose_calls: Arc<Mutex<u32>>,
        records: Arc<Mutex<Vec<FilterRecord>>>,
    }

    fn harness(
        risk: Behaviour<RiskMap>,
        dose: Behaviour<DoseLookup>,
        audit_fails: bool,
    ) -> Harness {
        let risk_calls = Arc::new(Mutex::new(0));
        let dose_calls = Arc::new(Mutex::new(0));
        let records = Arc::new(Mutex::new(vec![]));
        let filter = MedicationFilter::new(
            Box::new(MockRiskBuilder { calls: Arc::clone(&risk_calls), behaviour: risk }),
            Box::new(MockDoseBuilder { calls: Arc::clone(&dose_calls), behaviour: dose }),
            Box::new(AllergyOnlyEvaluator),
            Box::new(MockAudit { records: Arc::clone(&records), fail: audit_fails }),
        );
        Harness { filter, risk_calls, dose_calls, records }
    }

    fn generated<T>(value: T) -> Behaviour<T> {
        Behaviour::Return(Artifact::new(value, ArtifactSource::Generated))
    }

    // ── 1. Partitioning ──────────────────────────────────────────────────────

    /// Every candidate lands in exactly one partition, in input order.
    #[test]
    fn partitions_cover_every_candidate_in_order() {
        let h = harness(generated(penicillin_map()), generated(doses()), false);
        let meds = ["Cetirizine", "Amoxicillin", "Loratadine", "amoxicillin"];

        let result = h.filter.filter(&patient(&meds), Precomputed::none()).unwrap();

        let approved: Vec<&str> = result.approved.iter().map(|a| a.med.as_str()).collect();
        let unapproved: Vec<&str> = result.unapproved.iter().map(|u| u.med.as_str()).collect();
        assert_eq!(approved, vec!["Cetirizine", "Loratadine"]);
        assert_eq!(unapproved, vec!["Amoxicillin", "amoxicillin"]);
        assert_eq!(result.len(), meds.len());
        assert_eq!(result.unapproved[0].reasons, vec!["Patient is allergic to penicillin"]);
    }

    /// Approved candidates carry the looked-up dose, or N/A when absent.
    #[test]
    fn approved_candidates_get_dose_or_na() {
        let h = harness(generated(RiskMap::default()), generated(doses()), false);

        let result = h
            .filter
            .filter(&patient(&["cetirizine", "Loratadine"]), Precomputed::none())
            .unwrap();

        assert_eq!(result.approved[0].dosage, "10 mg");
        assert_eq!(result.approved[0].frequency, "once daily");
        assert_eq!(result.approved[1].dosage, "N/A");
        assert_eq!(result.approved[1].frequency, "N/A");
    }

    /// Artifacts are built once regardless of candidate count.
    #[test]
    fn builders_called_once_per_request() {
        let h = harness(generated(penicillin_map()), generated(doses()), false);

        h.filter
            .filter(&patient(&["a", "b", "c", "d", "e"]), Precomputed::none())
            .unwrap();

        assert_eq!(*h.risk_calls.lock().unwrap(), 1);
        assert_eq!(*h.dose_calls.lock().unwrap(), 1);
    }

    #[test]
    fn empty_candidate_list_yields_empty_result() {
        let h = harness(generated(penicillin_map()), generated(doses()), false);
        let result = h.filter.filter(&patient(&[]), Precomputed::none()).unwrap();
        assert!(result.is_empty());
    }

    // ── 2. Precomputed artifacts ─────────────────────────────────────────────

    /// A precomputed risk map is used verbatim and its builder is never called.
    #[test]
    fn precomputed_risk_map_skips_builder() {
        let h = harness(generated(RiskMap::default()), generated(doses()), false);
        let precomputed = Precomputed { risk_map: Some(penicillin_map()), dose_lookup: None };

        let report = h.filter.run(&patient(&["Amoxicillin"]), precomputed).unwrap();

        assert_eq!(*h.risk_calls.lock().unwrap(), 0);
        assert_eq!(*h.dose_calls.lock().unwrap(), 1);
        assert_eq!(report.risk_map_source, ArtifactSource::Precomputed);
        assert_eq!(report.result.unapproved.len(), 1);
    }

    /// Both precomputed: no builder is touched at all.
    #[test]
    fn fully_precomputed_request_makes_no_builder_calls() {
        let h = harness(Behaviour::Fail, Behaviour::Fail, false);
        let precomputed = Precomputed {
            risk_map: Some(penicillin_map()),
            dose_lookup: Some(doses()),
        };

        let report = h.filter.run(&patient(&["Cetirizine"]), precomputed).unwrap();

        assert_eq!(*h.risk_calls.lock().unwrap(), 0);
        assert_eq!(*h.dose_calls.lock().unwrap(), 0);
        assert_eq!(report.dose_source, ArtifactSource::Precomputed);
        assert_eq!(report.result.approved[0].dosage, "10 mg");
        assert!(!report.degraded());
    }

    // ── 3. Oracle failure policy ─────────────────────────────────────────────

    /// Under FailSoft, oracle errors become empty artifacts and the run is degraded.
    #[test]
    fn oracle_failure_fails_soft_by_default() {
        let h = harness(Behaviour::Fail, Behaviour::Fail, false);

        let report = h.filter.run(&patient(&["Amoxicillin"]), Precomputed::none()).unwrap();

        assert_eq!(report.risk_map_source, ArtifactSource::OracleUnavailable);
        assert_eq!(report.dose_source, ArtifactSource::OracleUnavailable);
        assert!(report.degraded());
        // Empty risk map: nothing is flagged by map rules.
        assert_eq!(report.result.approved.len(), 1);
        assert_eq!(report.result.approved[0].dosage, "N/A");
    }

    /// Under Propagate, the oracle error is returned and nothing is audited.
    #[test]
    fn oracle_failure_propagates_when_configured() {
        let h = harness(generated(penicillin_map()), Behaviour::Fail, false);
        let filter = h.filter.with_settings(FilterSettings {
            on_oracle_failure: OracleFailurePolicy::Propagate,
            concurrent_oracle_calls: false,
        });

        match filter.run(&patient(&["Amoxicillin"]), Precomputed::none()) {
            Err(MedguardError::OracleService { status, .. }) => assert_eq!(status, 503),
            other => panic!("expected OracleService error, got {:?}", other),
        }
        assert!(h.records.lock().unwrap().is_empty());
    }

    /// Unparseable artifacts pass through untouched and mark the run degraded.
    #[test]
    fn unparseable_artifact_marks_report_degraded() {
        let h = harness(
            Behaviour::Return(Artifact::fallback(ArtifactSource::Unparseable)),
            generated(doses()),
            false,
        );

        let report = h.filter.run(&patient(&["Amoxicillin"]), Precomputed::none()).unwrap();

        assert_eq!(report.risk_map_source, ArtifactSource::Unparseable);
        assert!(report.degraded());
    }

    // ── 4. Concurrency setting ───────────────────────────────────────────────

    #[test]
    fn sequential_and_concurrent_builds_agree() {
        let meds = ["Amoxicillin", "Cetirizine"];

        let concurrent = harness(generated(penicillin_map()), generated(doses()), false);
        let a = concurrent.filter.filter(&patient(&meds), Precomputed::none()).unwrap();

        let sequential = harness(generated(penicillin_map()), generated(doses()), false);
        let filter = sequential.filter.with_settings(FilterSettings {
            concurrent_oracle_calls: false,
            ..FilterSettings::default()
        });
        let b = filter.filter(&patient(&meds), Precomputed::none()).unwrap();

        assert_eq!(a, b);
    }

    // ── 5. Audit ─────────────────────────────────────────────────────────────

    #[test]
    fn every_run_writes_one_record() {
        let h = harness(generated(penicillin_map()), generated(doses()), false);
        let p = patient(&["Amoxicillin", "Cetirizine"]);

        let report = h.filter.run(&p, Precomputed::none()).unwrap();

        let records = h.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].execution_id, report.execution_id);
        assert_eq!(records[0].patient, p);
        assert_eq!(records[0].result, report.result);
    }

    #[test]
    fn audit_failure_fails_the_run() {
        let h = harness(generated(penicillin_map()), generated(doses()), true);

        match h.filter.run(&patient(&["Cetirizine"]), Precomputed::none()) {
            Err(MedguardError::AuditWriteFailed { reason }) => assert!(reason.contains("disk full")),
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
    }
}

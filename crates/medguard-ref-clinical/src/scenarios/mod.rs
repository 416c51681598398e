//! Clinical reference scenarios.
//!
//! Each scenario wires the real medguard components (oracle builders, rule
//! engine, hash-chained journal, filter orchestrator) to a `ScriptedOracle`
//! and one fictional patient, then prints the decisions and verifies the
//! journal. `execute()` returns the outcome for inspection; `run_scenario()`
//! prints it.

pub mod allergy;
pub mod oracle_outage;
pub mod pediatric_asthma;
pub mod precomputed;
pub mod pregnancy;

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{
    decision::FilterReport,
    error::{MedguardError, MedguardResult},
    patient::PatientRecord,
};
use medguard_core::{traits::SafetyEvaluator, MedicationFilter};
use medguard_knowledge::{OracleDoseLookupBuilder, OracleRiskMapBuilder};
use medguard_oracle::{KnowledgeClient, ScriptedOracle};

/// Prompt marker that only occurs in risk-map prompts.
pub(crate) const RISK_MAP_MARKER: &str = "allergy_map";

/// Prompt marker that only occurs in dose prompts.
pub(crate) const DOSE_MARKER: &str = "medication_doses";

/// Everything a scenario produced.
#[derive(Debug)]
pub struct ScenarioRun {
    pub patient: PatientRecord,
    pub report: FilterReport,
    pub journal: InMemoryAuditWriter,
    /// Requests the scripted oracle received.
    pub oracle_calls: usize,
}

/// Build a filter whose builders query `oracle` and whose runs are
/// recorded in `journal`.
pub(crate) fn scripted_filter(
    oracle: Arc<ScriptedOracle>,
    evaluator: Box<dyn SafetyEvaluator>,
    journal: &InMemoryAuditWriter,
) -> MedicationFilter {
    let client = KnowledgeClient::new(oracle);
    MedicationFilter::new(
        Box::new(OracleRiskMapBuilder::new(client.clone())),
        Box::new(OracleDoseLookupBuilder::new(client)),
        evaluator,
        Box::new(journal.clone()),
    )
}

// ── Printing ──────────────────────────────────────────────────────────────────

pub(crate) fn print_patient(patient: &PatientRecord) {
    println!("  Patient:     age {}, pregnant: {}", patient.age, patient.pregnant);
    println!("  Allergies:   {}", list_or_none(&patient.allergies));
    println!("  Conditions:  {}", list_or_none(&patient.conditions));
    println!("  Candidates:  {}", list_or_none(&patient.suggested_meds));
    println!();
}

pub(crate) fn print_report(report: &FilterReport) {
    println!("  Risk map source:  {}", report.risk_map_source);
    println!("  Dose source:      {}", report.dose_source);
    if report.degraded() {
        println!("  DEGRADED: decisions rest on fail-soft defaults");
    }
    println!();

    for approved in &report.result.approved {
        println!(
            "  APPROVED    {:<32} {} | {}",
            approved.med, approved.dosage, approved.frequency
        );
    }
    for unapproved in &report.result.unapproved {
        println!(
            "  UNAPPROVED  {:<32} {}",
            unapproved.med,
            unapproved.reasons.join("; ")
        );
    }
    println!();
}

/// Print the journal state and fail if the chain does not verify.
pub(crate) fn verify_journal(journal: &InMemoryAuditWriter) -> MedguardResult<()> {
    let integrity_ok = journal.verify_integrity();
    let log = journal.export_log()?;

    println!(
        "  Audit chain integrity:  {} ({} run(s) in journal '{}')",
        if integrity_ok { "VERIFIED" } else { "FAILED" },
        log.len(),
        log.journal_id
    );

    if integrity_ok {
        Ok(())
    } else {
        Err(MedguardError::AuditWriteFailed {
            reason: format!("journal '{}' failed chain verification", log.journal_id),
        })
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

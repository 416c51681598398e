//! Scenario 4: Oracle outage
//!
//! The risk-map request never reaches the oracle and the dose answer comes
//! back wrapped in prose. Under the default fail-soft policy the filter still
//! answers: the guard rule catches the NSAID, the antihistamine is approved
//! with unknown dose, and the report is marked degraded.

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{error::MedguardResult, request::Precomputed};
use medguard_oracle::ScriptedOracle;
use medguard_policy::SafetyRuleEngine;

use crate::mock_data::{chatty_doses, outage_patient};
use crate::scenarios::{
    print_patient, print_report, scripted_filter, verify_journal, ScenarioRun, DOSE_MARKER,
    RISK_MAP_MARKER,
};

pub fn execute() -> MedguardResult<ScenarioRun> {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .unreachable(RISK_MAP_MARKER)
            .reply(DOSE_MARKER, chatty_doses()),
    );
    let journal = InMemoryAuditWriter::new("oracle-outage");
    let filter = scripted_filter(
        Arc::clone(&oracle),
        Box::new(SafetyRuleEngine::new()),
        &journal,
    );

    let patient = outage_patient();
    let report = filter.run(&patient, Precomputed::none())?;

    Ok(ScenarioRun {
        patient,
        report,
        journal,
        oracle_calls: oracle.calls(),
    })
}

pub fn run_scenario() -> MedguardResult<()> {
    println!("=== Scenario 4: Oracle Outage (fail-soft) ===");
    println!();

    let run = execute()?;
    print_patient(&run.patient);
    print_report(&run.report);
    verify_journal(&run.journal)?;

    println!();
    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}

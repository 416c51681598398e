//! medguard command line.
//!
//! Filters a patient file through the medication safety filter, or runs the
//! clinical reference scenarios against a scripted oracle.
//!
//! Usage:
//!   cargo run -p medguard-cli -- filter --input patient.json --pretty
//!   cargo run -p medguard-cli -- filter --input patient.json --config medguard.toml
//!   cargo run -p medguard-cli -- scenarios run-all
//!   cargo run -p medguard-cli -- scenarios oracle-outage

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{
    error::{MedguardError, MedguardResult},
    request::FilterRequest,
};
use medguard_core::{traits::TextOracle, MedicationFilter};
use medguard_knowledge::{OracleDoseLookupBuilder, OracleRiskMapBuilder};
use medguard_oracle::{KnowledgeClient, MessagesOracle, ScriptedOracle};
use medguard_ref_clinical::scenarios::{
    allergy, oracle_outage, pediatric_asthma, precomputed, pregnancy,
};

use crate::config::MedguardConfig;

// ── CLI definition ────────────────────────────────────────────────────────────

/// medguard: medication safety filter.
#[derive(Parser)]
#[command(
    name = "medguard",
    about = "Classify suggested medications as approved or unapproved for a patient",
    long_about = "Builds a risk map and dose table from a knowledge oracle, applies\n\
                  deterministic safety rules to each suggested medication, and\n\
                  records every run in a hash-chained audit journal."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter the suggested medications in a patient JSON file.
    Filter {
        /// Patient request JSON (allergies, conditions, age, pregnant,
        /// suggested_meds, optional agent2_med_maps / agent2_dose_dict).
        #[arg(long, short)]
        input: PathBuf,

        /// Combined TOML configuration ([oracle], [filter], [[rules]]).
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Pretty-print the result JSON.
        #[arg(long)]
        pretty: bool,

        /// Write the exported audit journal as JSON to this file.
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },
    /// Run the clinical reference scenarios with a scripted oracle.
    Scenarios {
        #[command(subcommand)]
        scenario: Scenario,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum Scenario {
    /// Run all five scenarios in sequence.
    RunAll,
    /// Scenario 1: guard rules reject NSAIDs the oracle missed.
    PediatricAsthma,
    /// Scenario 2: pregnancy-unsafe candidates.
    Pregnancy,
    /// Scenario 3: one reason per matching allergy.
    Allergy,
    /// Scenario 4: fail-soft defaults during an oracle outage.
    OracleOutage,
    /// Scenario 5: precomputed artifacts, oracle never called.
    Precomputed,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // A missing .env file is fine; the API key may already be exported.
    dotenv::dotenv().ok();

    // Initialize structured logging. Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Filter {
            input,
            config,
            pretty,
            audit_log,
        } => run_filter(&input, config.as_deref(), pretty, audit_log.as_deref()),
        Command::Scenarios { scenario } => run_scenarios(scenario),
    };

    if let Err(e) = result {
        eprintln!("medguard error: {}", e);
        std::process::exit(1);
    }
}

// ── filter ────────────────────────────────────────────────────────────────────

fn run_filter(
    input: &Path,
    config_path: Option<&Path>,
    pretty: bool,
    audit_log: Option<&Path>,
) -> MedguardResult<()> {
    let config = match config_path {
        Some(path) => MedguardConfig::from_file(path)?,
        None => MedguardConfig::default(),
    };

    let raw = std::fs::read_to_string(input).map_err(|e| MedguardError::InvalidRequest {
        reason: format!("failed to read input file '{}': {}", input.display(), e),
    })?;
    let (patient, precomputed) = FilterRequest::from_json_str(&raw)?.into_parts();

    // With both artifacts supplied the oracle is never consulted, so no API
    // key is required.
    let oracle: Arc<dyn TextOracle> =
        if precomputed.risk_map.is_some() && precomputed.dose_lookup.is_some() {
            Arc::new(ScriptedOracle::new())
        } else {
            Arc::new(MessagesOracle::from_config(config.oracle.clone())?)
        };
    let client = KnowledgeClient::new(oracle);
    let journal = InMemoryAuditWriter::new("medguard-cli");

    let filter = MedicationFilter::new(
        Box::new(OracleRiskMapBuilder::new(client.clone()).with_max_tokens(config.oracle.max_tokens)),
        Box::new(OracleDoseLookupBuilder::new(client).with_max_tokens(config.oracle.max_tokens)),
        Box::new(config.rule_engine()?),
        Box::new(journal.clone()),
    )
    .with_settings(config.filter.clone());

    let report = filter.run(&patient, precomputed)?;

    let encoded = if pretty {
        serde_json::to_string_pretty(&report.result)
    } else {
        serde_json::to_string(&report.result)
    }
    .map_err(|e| MedguardError::InvalidRequest {
        reason: format!("failed to encode filter result: {}", e),
    })?;
    println!("{}", encoded);

    if report.degraded() {
        eprintln!(
            "warning: degraded result (risk map: {}, doses: {}); only guard rules and known doses apply",
            report.risk_map_source, report.dose_source
        );
    }

    if let Some(path) = audit_log {
        write_journal(&journal, path)?;
    }

    Ok(())
}

fn write_journal(journal: &InMemoryAuditWriter, path: &Path) -> MedguardResult<()> {
    let log = journal.export_log()?;
    let json = serde_json::to_string_pretty(&log).map_err(|e| MedguardError::AuditWriteFailed {
        reason: format!("failed to encode audit journal: {}", e),
    })?;
    std::fs::write(path, json).map_err(|e| MedguardError::AuditWriteFailed {
        reason: format!("failed to write audit journal '{}': {}", path.display(), e),
    })?;

    info!(
        path = %path.display(),
        runs = log.len(),
        terminal_hash = %log.terminal_hash,
        "audit journal written"
    );
    Ok(())
}

// ── scenarios ─────────────────────────────────────────────────────────────────

fn run_scenarios(scenario: Scenario) -> MedguardResult<()> {
    print_banner();

    match scenario {
        Scenario::RunAll => {
            pediatric_asthma::run_scenario()?;
            pregnancy::run_scenario()?;
            allergy::run_scenario()?;
            oracle_outage::run_scenario()?;
            precomputed::run_scenario()?;
        }
        Scenario::PediatricAsthma => pediatric_asthma::run_scenario()?,
        Scenario::Pregnancy => pregnancy::run_scenario()?,
        Scenario::Allergy => allergy::run_scenario()?,
        Scenario::OracleOutage => oracle_outage::run_scenario()?,
        Scenario::Precomputed => precomputed::run_scenario()?,
    }

    println!("All selected scenarios completed successfully.");
    Ok(())
}

fn print_banner() {
    println!();
    println!("medguard: medication safety filter");
    println!("Clinical Reference Scenarios");
    println!("==================================");
    println!();
    println!("Per request:");
    println!("  [1] Risk map and dose table built once (or reused if supplied)");
    println!("  [2] Each candidate checked: allergies, pregnancy, conditions, guard rules");
    println!("  [3] Any reason rejects; otherwise approved with dose (N/A if unknown)");
    println!("  [4] One record appended to the SHA-256 audit journal");
    println!();
}

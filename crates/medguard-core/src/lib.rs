//! # medguard-core
//!
//! The medication-safety filter orchestrator.
//!
//! This crate provides:
//! - The collaborator traits (`TextOracle`, `RiskMapBuilder`,
//!   `DoseLookupBuilder`, `SafetyEvaluator`, `AuditWriter`)
//! - `MedicationFilter`, which builds both knowledge artifacts once per
//!   request, evaluates every candidate, and partitions the results
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medguard_core::{MedicationFilter, FilterSettings};
//!
//! let filter = MedicationFilter::new(risk_builder, dose_builder, evaluator, audit)
//!     .with_settings(FilterSettings::default());
//! let result = filter.filter(&patient, Precomputed::none())?;
//! ```

pub mod filter;
pub mod settings;
pub mod traits;

pub use filter::MedicationFilter;
pub use settings::{FilterSettings, OracleFailurePolicy};

//! # medguard-knowledge
//!
//! Candidate-scoped knowledge artifacts generated by the oracle.
//!
//! - [`OracleRiskMapBuilder`] implements
//!   [`RiskMapBuilder`](medguard_core::traits::RiskMapBuilder).
//! - [`OracleDoseLookupBuilder`] implements
//!   [`DoseLookupBuilder`](medguard_core::traits::DoseLookupBuilder).
//!
//! The oracle's output is untrusted text. Parsing is strict JSON followed
//! by a JSON Schema shape check; anything that fails resolves to an empty
//! artifact tagged `Unparseable`. It is never an error, and it is never
//! treated as proof that every candidate is safe.

pub mod dose;
pub mod prompts;
pub mod risk_map;
pub mod schema;

pub use dose::{parse_dose_lookup, OracleDoseLookupBuilder};
pub use risk_map::{parse_risk_map, OracleRiskMapBuilder};

// ── Tests ─────────────────────────────────────────────────────────────────────

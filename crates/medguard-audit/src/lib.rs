//! # medguard-audit
//!
//! Append-only, SHA-256 hash-chained journal of medguard filter runs.
//!
//! ## Overview
//!
//! Every completed run produces one `FilterRecord` (patient, artifact
//! sources, decisions). The writer wraps it in an `AuditEvent` linked to the
//! previous event by hash, so editing any recorded decision, even a single
//! reason string, breaks the chain and is caught by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medguard_audit::InMemoryAuditWriter;
//!
//! // Clones share one journal, so keep a handle for verification.
//! let journal = InMemoryAuditWriter::new("ward-3");
//! let filter = MedicationFilter::new(risk, doses, engine, Box::new(journal.clone()));
//! filter.run(&patient, Precomputed::none())?;
//!
//! assert!(journal.verify_integrity());
//! let log = journal.export_log()?;
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

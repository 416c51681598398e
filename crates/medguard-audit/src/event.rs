//! Audit event and log types.
//!
//! `AuditEvent` wraps one `FilterRecord` with its sequence number and the
//! SHA-256 hashes that make tampering detectable. `AuditLog` is the exported
//! snapshot of a journal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use medguard_contracts::decision::FilterRecord;

/// A single entry in a journal's hash chain.
///
/// Modifying any field, including those of the embedded `record`,
/// invalidates `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The journal this event was appended to.
    pub journal_id: String,

    /// One completed filter run.
    pub record: FilterRecord,

    /// `this_hash` of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over (journal_id, sequence, prev_hash, record).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain: 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of a journal.
///
/// `terminal_hash` is the `this_hash` of the last event and commits to the
/// whole log. It is empty when no run has been recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub journal_id: String,

    /// All events in chain order (sequence 0 first).
    pub events: Vec<AuditEvent>,

    /// Wall-clock time (UTC) the snapshot was taken.
    pub exported_at: DateTime<Utc>,

    pub terminal_hash: String,
}

impl AuditLog {
    /// Number of filter runs recorded.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps the journal in a `Vec` behind a `Mutex`, so
//! one writer can be shared by every `MedicationFilter` run in a process.
//! Call `export_log()` for a snapshot and `verify_integrity()` to confirm
//! the chain has not been altered.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::info;

use medguard_contracts::{
    decision::FilterRecord,
    error::{MedguardError, MedguardResult},
};
use medguard_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An in-memory, append-only journal of filter runs backed by a SHA-256
/// hash chain.
#[derive(Clone)]
pub struct InMemoryAuditWriter {
    journal_id: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    /// Create an empty journal named `journal_id`.
    pub fn new(journal_id: impl Into<String>) -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            journal_id: journal_id.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn journal_id(&self) -> &str {
        &self.journal_id
    }

    /// Snapshot every event written so far.
    pub fn export_log(&self) -> MedguardResult<AuditLog> {
        let state = self.lock()?;
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        Ok(AuditLog {
            journal_id: self.journal_id.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        })
    }

    /// Verify that the in-memory chain has not been tampered with.
    ///
    /// A poisoned lock counts as a failed verification.
    pub fn verify_integrity(&self) -> bool {
        match self.lock() {
            Ok(state) => verify_chain(&state.events),
            Err(_) => false,
        }
    }

    fn lock(&self) -> MedguardResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| MedguardError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }
}

impl std::fmt::Debug for InMemoryAuditWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAuditWriter")
            .field("journal_id", &self.journal_id)
            .finish_non_exhaustive()
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    /// Append one filter record to the hash chain.
    fn write(&self, record: &FilterRecord) -> MedguardResult<()> {
        let mut state = self.lock()?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.journal_id, sequence, record, &prev_hash)?;

        state.events.push(AuditEvent {
            sequence,
            journal_id: self.journal_id.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        info!(
            journal_id = %self.journal_id,
            execution_id = %record.execution_id,
            sequence = sequence,
            "filter run recorded"
        );

        Ok(())
    }
}

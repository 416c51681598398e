//! # medguard-oracle
//!
//! The knowledge-oracle client for medguard.
//!
//! [`KnowledgeClient`] wraps any [`TextOracle`](medguard_core::traits::TextOracle)
//! and pins sampling to zero. Two backends ship here:
//!
//! - [`MessagesOracle`] - blocking HTTP client for a messages-style
//!   completion API, configured by [`OracleConfig`].
//! - [`ScriptedOracle`] - deterministic marker-matched replies, for tests
//!   and offline runs.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medguard_oracle::{KnowledgeClient, MessagesOracle, OracleConfig};
//!
//! let oracle = MessagesOracle::from_config(OracleConfig::default())?;
//! let client = KnowledgeClient::new(Arc::new(oracle));
//! let text = client.query("Cautious medical safety assistant.", &prompt, 500)?;
//! ```

pub mod client;
pub mod config;
pub mod messages;
pub mod scripted;

pub use client::KnowledgeClient;
pub use config::OracleConfig;
pub use messages::MessagesOracle;
pub use scripted::{ScriptedOracle, ScriptedReply};

// ── Tests ─────────────────────────────────────────────────────────────────────

//! # medguard-contracts
//!
//! Shared types for the medguard medication-safety filter.
//!
//! All crates in the workspace import from here. No decision logic lives in
//! this crate, only data definitions, lenient decoding, and error types.

mod de;

pub mod decision;
pub mod dose;
pub mod error;
pub mod oracle;
pub mod patient;
pub mod request;
pub mod risk;

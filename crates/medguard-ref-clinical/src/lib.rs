//! # medguard-ref-clinical
//!
//! Clinical reference scenarios for the medguard medication filter.
//!
//! Demonstrates five situations using a scripted oracle:
//!
//! 1. **Pediatric asthma**: guard rules reject NSAIDs the oracle missed.
//! 2. **Pregnancy**: pregnancy-unsafe candidates are rejected.
//! 3. **Multiple allergies**: one reason per matching allergy.
//! 4. **Oracle outage**: fail-soft defaults and a degraded report.
//! 5. **Precomputed artifacts**: upstream maps reused, oracle never called.
//!
//! All patients and oracle answers are hardcoded and fictional. No network
//! calls are made.

pub mod mock_data;
pub mod scenarios;

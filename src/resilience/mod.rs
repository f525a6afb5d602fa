//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! QuotationService:
//!     → timeouts.rs (allocate a Deadline per hop)
//!     → hop runs under its Deadline
//!     → outcome.rs (classify: Timeout / Transport / Decode / Store)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: each hop runs exactly once per request
//! - Timeout is always distinguishable from a broken collaborator

pub mod outcome;
pub mod timeouts;

pub use outcome::{outcome_label, Hop, HopError, Outcome};
pub use timeouts::Deadline;

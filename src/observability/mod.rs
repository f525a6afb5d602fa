//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every hop and the relay endpoint produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (text or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound header into hop logs
//! - Hop start/end logs are informational, never part of a hop's result

pub mod logging;
pub mod metrics;

//! Quotation persistence subsystem.
//!
//! # Data Flow
//! ```text
//! QuotationService
//!     → store.rs (deadline, blocking pool, outcome classification)
//!     → repository.rs (QuotationRepository trait)
//!     → sqlite.rs (schema + idempotent insert)
//! ```

pub mod repository;
pub mod sqlite;
pub mod store;

pub use repository::{QuotationRepository, StorageError};
pub use sqlite::SqliteQuotationRepository;
pub use store::QuotationStore;

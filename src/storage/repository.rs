//! Persistence seam for quotation rows.

use thiserror::Error;
use uuid::Uuid;

use crate::quotation::QuotationRecord;

/// Errors raised by a [`QuotationRepository`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous writer panicked while holding the connection.
    #[error("connection lock poisoned")]
    Poisoned,

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Blocking row store for fetched quotations.
///
/// `create_row` must be idempotent per `request_id`: writing the same id twice
/// leaves exactly one row.
pub trait QuotationRepository: Send + Sync {
    fn create_row(&self, request_id: Uuid, record: &QuotationRecord) -> Result<(), StorageError>;
}

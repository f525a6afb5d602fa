//! SQLite-backed quotation repository.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::quotation::QuotationRecord;
use crate::storage::repository::{QuotationRepository, StorageError};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS quotations (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        request_id  TEXT NOT NULL UNIQUE,
        code        TEXT NOT NULL,
        codein      TEXT NOT NULL,
        name        TEXT NOT NULL,
        high        TEXT NOT NULL,
        low         TEXT NOT NULL,
        var_bid     TEXT NOT NULL,
        pct_change  TEXT NOT NULL,
        bid         TEXT NOT NULL,
        ask         TEXT NOT NULL,
        timestamp   TEXT NOT NULL,
        create_date TEXT NOT NULL
    );
";

const INSERT: &str = "
    INSERT INTO quotations
        (request_id, code, codein, name, high, low, var_bid, pct_change, bid, ask, timestamp, create_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    ON CONFLICT(request_id) DO NOTHING
";

/// Quotation rows in a single SQLite database.
///
/// SQLite allows one writer at a time, so the connection sits behind a mutex
/// and every write holds it for its whole duration.
pub struct SqliteQuotationRepository {
    conn: Mutex<Connection>,
}

impl SqliteQuotationRepository {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let journal: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        tracing::debug!(journal_mode = %journal, "SQLite opened");
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("Quotation schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    /// Number of stored quotations.
    pub fn row_count(&self) -> Result<u64, StorageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM quotations", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Bid stored for `request_id`, if any.
    pub fn find_bid(&self, request_id: Uuid) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let bid = conn
            .query_row(
                "SELECT bid FROM quotations WHERE request_id = ?1",
                params![request_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(bid)
    }
}

impl QuotationRepository for SqliteQuotationRepository {
    fn create_row(&self, request_id: Uuid, record: &QuotationRecord) -> Result<(), StorageError> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            INSERT,
            params![
                request_id.to_string(),
                record.code(),
                record.counter_code(),
                record.name(),
                record.high(),
                record.low(),
                record.variation(),
                record.percent_change(),
                record.bid(),
                record.ask(),
                record.timestamp(),
                record.create_date(),
            ],
        )?;
        if inserted == 0 {
            tracing::debug!(request_id = %request_id, "Quotation row already present");
        }
        Ok(())
    }
}

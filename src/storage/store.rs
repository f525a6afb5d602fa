//! Deadline-bounded quotation persistence.
//!
//! # Responsibilities
//! - Run the blocking row insert off the async runtime
//! - Report `Timeout` once the persist deadline has fired
//! - Report every other failure as `Store`
//!
//! # Design Decisions
//! - One write slot per store. A request waits for the slot inside its own
//!   deadline, so at most one insert is ever running, detached or not.
//! - The insert cannot be cancelled mid-flight. When the deadline fires first
//!   the caller gets `Timeout` right away and the insert finishes detached,
//!   still holding the slot until it returns.
//! - A write that returns after the deadline is also reported as `Timeout`,
//!   even though the row may exist. Rows are keyed by request id, so a late
//!   write never duplicates.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::observability::metrics;
use crate::quotation::QuotationRecord;
use crate::resilience::{outcome_label, Deadline, HopError, Outcome};
use crate::storage::repository::{QuotationRepository, StorageError};

/// Writes quotations through a [`QuotationRepository`] under a deadline.
#[derive(Clone)]
pub struct QuotationStore {
    repository: Arc<dyn QuotationRepository>,
    write_slot: Arc<Semaphore>,
}

impl QuotationStore {
    pub fn new(repository: Arc<dyn QuotationRepository>) -> Self {
        Self {
            repository,
            write_slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Persist `record` for `request_id`, bounded by `deadline`.
    pub async fn save(
        &self,
        record: QuotationRecord,
        request_id: Uuid,
        deadline: &Deadline,
    ) -> Outcome<()> {
        let started = Instant::now();
        tracing::info!(
            request_id = %request_id,
            budget_ms = deadline.budget().as_millis() as u64,
            "Saving quotation"
        );

        let write_slot = Arc::clone(&self.write_slot);
        let repository = Arc::clone(&self.repository);
        let write = async move {
            let permit = write_slot
                .acquire_owned()
                .await
                .map_err(|_| HopError::Store("write slot closed".into()))?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                repository.create_row(request_id, &record)
            })
            .await
            .map_err(|e| HopError::Store(format!("write task failed: {}", e)))
        };

        let outcome = match deadline.run(write).await {
            Err(timeout) => Err(timeout),
            Ok(Err(e)) => Err(e),
            Ok(Ok(written)) => settle(written, deadline, request_id),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => tracing::info!(request_id = %request_id, elapsed_ms, "Quotation saved"),
            Err(e) if e.is_timeout() => {
                tracing::warn!(request_id = %request_id, elapsed_ms, "Persist deadline reached")
            }
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, elapsed_ms, "Quotation save failed")
            }
        }
        metrics::record_hop(deadline.hop(), outcome_label(&outcome), started);

        outcome
    }
}

/// Classify a write that returned, checking the deadline after the fact.
fn settle(written: Result<(), StorageError>, deadline: &Deadline, request_id: Uuid) -> Outcome<()> {
    if deadline.is_expired() {
        tracing::debug!(
            request_id = %request_id,
            written = written.is_ok(),
            "Write returned after persist deadline"
        );
        return Err(deadline.timeout_error());
    }
    written.map_err(|e| HopError::Store(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::quotation::decode_quotation;
    use crate::quotation::types::fixtures;
    use crate::resilience::Hop;
    use crate::storage::sqlite::SqliteQuotationRepository;

    /// Repository that blocks for `delay`, then succeeds or fails.
    struct ScriptedRepository {
        delay: Duration,
        fail: bool,
        writes: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl ScriptedRepository {
        fn new(delay: Duration, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                delay,
                fail,
                writes: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                max_active: AtomicUsize::new(0),
            })
        }
    }

    impl QuotationRepository for ScriptedRepository {
        fn create_row(&self, _: Uuid, _: &QuotationRecord) -> Result<(), StorageError> {
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(StorageError::Unavailable("disk full".into()))
            } else {
                Ok(())
            }
        }
    }

    fn record() -> QuotationRecord {
        decode_quotation(fixtures::upstream_body("5.4321").as_bytes(), "USDBRL").unwrap()
    }

    #[tokio::test]
    async fn test_save_writes_row() {
        let repo = Arc::new(SqliteQuotationRepository::open_in_memory().unwrap());
        let store = QuotationStore::new(repo.clone());
        let id = Uuid::new_v4();
        let deadline = Deadline::start(Hop::Persist, Duration::from_millis(500));

        store.save(record(), id, &deadline).await.unwrap();
        assert_eq!(repo.find_bid(id).unwrap().as_deref(), Some("5.4321"));
    }

    #[tokio::test]
    async fn test_slow_write_returns_timeout_within_budget() {
        let repo = ScriptedRepository::new(Duration::from_millis(200), false);
        let store = QuotationStore::new(repo.clone());
        let deadline = Deadline::start(Hop::Persist, Duration::from_millis(10));

        let started = Instant::now();
        let err = store.save(record(), Uuid::new_v4(), &deadline).await.unwrap_err();

        assert_eq!(
            err,
            HopError::Timeout {
                hop: Hop::Persist,
                budget: Duration::from_millis(10),
            }
        );
        assert!(started.elapsed() < Duration::from_millis(100));

        // The detached write still runs to completion.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(repo.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_write_is_store_error() {
        let store = QuotationStore::new(ScriptedRepository::new(Duration::ZERO, true));
        let deadline = Deadline::start(Hop::Persist, Duration::from_millis(500));

        let err = store.save(record(), Uuid::new_v4(), &deadline).await.unwrap_err();
        assert_eq!(err, HopError::Store("storage unavailable: disk full".into()));
    }

    #[tokio::test]
    async fn test_timed_out_writes_do_not_pile_up() {
        let repo = ScriptedRepository::new(Duration::from_millis(50), false);
        let store = QuotationStore::new(repo.clone());

        let started = Instant::now();
        for _ in 0..20 {
            let deadline = Deadline::start(Hop::Persist, Duration::from_millis(10));
            let err = store.save(record(), Uuid::new_v4(), &deadline).await.unwrap_err();
            assert!(err.is_timeout());
        }
        assert!(started.elapsed() < Duration::from_millis(600));

        let mut concurrent = tokio::task::JoinSet::new();
        for _ in 0..20 {
            let store = store.clone();
            concurrent.spawn(async move {
                let deadline = Deadline::start(Hop::Persist, Duration::from_millis(10));
                store.save(record(), Uuid::new_v4(), &deadline).await
            });
        }
        while let Some(joined) = concurrent.join_next().await {
            assert!(joined.unwrap().unwrap_err().is_timeout());
        }

        assert_eq!(repo.max_active.load(Ordering::SeqCst), 1);
        // Only requests that reached the slot inside their budget ever started a write.
        let started_writes = repo.writes.load(Ordering::SeqCst) + repo.active.load(Ordering::SeqCst);
        assert!(started_writes < 20, "{} writes started for 40 requests", started_writes);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(repo.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_write_returning_after_deadline_is_timeout() {
        let expired = Deadline::start(Hop::Persist, Duration::ZERO);

        assert_eq!(
            settle(Ok(()), &expired, Uuid::new_v4()),
            Err(HopError::Timeout {
                hop: Hop::Persist,
                budget: Duration::ZERO,
            })
        );
        assert!(settle(Err(StorageError::Poisoned), &expired, Uuid::new_v4())
            .unwrap_err()
            .is_timeout());
    }

    #[test]
    fn test_write_returning_in_time_keeps_its_result() {
        let live = Deadline::start(Hop::Persist, Duration::from_secs(60));

        assert_eq!(settle(Ok(()), &live, Uuid::new_v4()), Ok(()));
        assert_eq!(
            settle(Err(StorageError::Poisoned), &live, Uuid::new_v4()),
            Err(HopError::Store("connection lock poisoned".into()))
        );
    }
}

//! Per-hop deadlines.
//!
//! # Responsibilities
//! - Give every hop its own budget and absolute expiry instant
//! - Bound a future by that expiry
//! - Answer "has the deadline already fired?" after a non-cancellable call
//!
//! # Design Decisions
//! - Uses Tokio's clock so paused-time tests stay deterministic
//! - Deadlines are never derived from each other; each hop allocates its own
//! - Timeout errors carry the hop and budget they belong to

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::resilience::outcome::{Hop, HopError};

/// A time budget attached to one hop.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    hop: Hop,
    budget: Duration,
    expires_at: Instant,
}

impl Deadline {
    /// Start a fresh deadline for `hop`, expiring `budget` from now.
    pub fn start(hop: Hop, budget: Duration) -> Self {
        Self {
            hop,
            budget,
            expires_at: Instant::now() + budget,
        }
    }

    pub fn hop(&self) -> Hop {
        self.hop
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// True once the expiry instant has been reached.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// The error reported when this deadline fires.
    pub fn timeout_error(&self) -> HopError {
        HopError::Timeout {
            hop: self.hop,
            budget: self.budget,
        }
    }

    /// Drive `fut` until it completes or the deadline fires.
    ///
    /// The future is dropped on expiry, which cancels it at its next
    /// suspension point.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, HopError>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.expires_at, fut)
            .await
            .map_err(|_| self.timeout_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_value_within_budget() {
        let deadline = Deadline::start(Hop::Fetch, Duration::from_millis(200));
        let value = deadline
            .run(async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                42
            })
            .await;
        assert_eq!(value, Ok(42));
        assert!(!deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_times_out_with_hop_error() {
        let deadline = Deadline::start(Hop::Fetch, Duration::from_millis(200));
        let result = deadline.run(std::future::pending::<()>()).await;
        assert_eq!(
            result,
            Err(HopError::Timeout {
                hop: Hop::Fetch,
                budget: Duration::from_millis(200),
            })
        );
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadlines_are_independent() {
        let fetch = Deadline::start(Hop::Fetch, Duration::from_millis(200));
        tokio::time::sleep(Duration::from_millis(195)).await;

        // A persist deadline allocated late in the fetch budget still gets its full budget.
        let persist = Deadline::start(Hop::Persist, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(15)).await;

        assert!(fetch.is_expired());
        assert!(persist.is_expired());
        assert!(persist.expires_at() > fetch.expires_at());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_is_budget_after_start() {
        let before = Instant::now();
        let deadline = Deadline::start(Hop::Persist, Duration::from_millis(10));
        assert_eq!(deadline.expires_at() - before, Duration::from_millis(10));
        assert_eq!(deadline.hop(), Hop::Persist);

        tokio::time::sleep(Duration::from_millis(9)).await;
        assert!(!deadline.is_expired());
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(deadline.is_expired());
    }
}

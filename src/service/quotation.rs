//! Fetch → persist orchestration.
//!
//! # Responsibilities
//! - Give each hop its own, independently allocated deadline
//! - Skip persistence when the fetch fails, forwarding the fetch failure
//! - Apply the configured [`PersistencePolicy`] to store failures
//!
//! # Design Decisions
//! - No retries: one fetch and at most one write per request
//! - The persist deadline starts when the fetch finishes, with its full budget
//! - The caller's response waits for the bounded persist attempt

use std::time::Duration;

use uuid::Uuid;

use crate::config::{PersistencePolicy, RelayConfig};
use crate::quotation::QuotationRecord;
use crate::resilience::{Deadline, Hop, Outcome};
use crate::storage::QuotationStore;
use crate::upstream::UpstreamFetcher;

/// Budgets and policy of one [`QuotationService`].
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub fetch_budget: Duration,
    pub persist_budget: Duration,
    pub persistence_policy: PersistencePolicy,
}

impl ServiceSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            fetch_budget: config.timeouts.fetch(),
            persist_budget: config.timeouts.persist(),
            persistence_policy: config.storage.persistence_policy,
        }
    }
}

/// Fetches the current quotation and records it.
pub struct QuotationService {
    fetcher: UpstreamFetcher,
    store: QuotationStore,
    settings: ServiceSettings,
}

impl QuotationService {
    pub fn new(fetcher: UpstreamFetcher, store: QuotationStore, settings: ServiceSettings) -> Self {
        Self {
            fetcher,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Fetch the current quotation and attempt to persist it.
    pub async fn get_quote(&self, request_id: Uuid) -> Outcome<QuotationRecord> {
        let fetch_deadline = Deadline::start(Hop::Fetch, self.settings.fetch_budget);
        let record = self.fetcher.fetch(&fetch_deadline).await?;

        let persist_deadline = Deadline::start(Hop::Persist, self.settings.persist_budget);
        let saved = self
            .store
            .save(record.clone(), request_id, &persist_deadline)
            .await;

        match (saved, self.settings.persistence_policy) {
            (Ok(()), _) => {}
            (Err(e), PersistencePolicy::BestEffort) => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %e,
                    "Quotation not persisted, relaying anyway"
                );
            }
            (Err(e), PersistencePolicy::Strict) => {
                tracing::error!(request_id = %request_id, error = %e, "Quotation not persisted");
                return Err(e);
            }
        }

        Ok(record)
    }
}

//! Outbound quotation fetch.
//!
//! # Responsibilities
//! - Issue one GET to the upstream provider under the fetch deadline
//! - Decode the body into a [`QuotationRecord`]
//! - Classify failures: slow upstream (`Timeout`) vs broken upstream
//!   (`Transport`, `Decode`)

use std::time::Instant;

use reqwest::Client;
use url::Url;

use crate::observability::metrics;
use crate::quotation::{decode_quotation, QuotationRecord};
use crate::resilience::{outcome_label, Deadline, HopError, Outcome};

/// Client for the upstream quotation provider.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: Client,
    url: Url,
    pair_key: String,
}

impl UpstreamFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(url: Url, pair_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, url, pair_key))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, url: Url, pair_key: impl Into<String>) -> Self {
        Self {
            client,
            url,
            pair_key: pair_key.into(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the current quotation, bounded by `deadline`.
    pub async fn fetch(&self, deadline: &Deadline) -> Outcome<QuotationRecord> {
        let started = Instant::now();
        tracing::info!(
            url = %self.url,
            budget_ms = deadline.budget().as_millis() as u64,
            "Upstream fetch started"
        );

        let outcome = self.fetch_within(deadline).await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(record) => {
                tracing::info!(bid = %record.bid(), elapsed_ms, "Upstream fetch finished")
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(elapsed_ms, "Upstream fetch deadline reached")
            }
            Err(e) => tracing::warn!(error = %e, elapsed_ms, "Upstream fetch failed"),
        }
        metrics::record_hop(deadline.hop(), outcome_label(&outcome), started);

        outcome
    }

    async fn fetch_within(&self, deadline: &Deadline) -> Outcome<QuotationRecord> {
        let body = deadline
            .run(self.download())
            .await?
            .map_err(|e| classify(e, deadline))?;

        decode_quotation(&body, &self.pair_key)
    }

    /// Send the request and read the full body.
    async fn download(&self) -> Result<Vec<u8>, reqwest::Error> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// A transport failure counts as a timeout when it coincides with expiry.
fn classify(err: reqwest::Error, deadline: &Deadline) -> HopError {
    if err.is_timeout() || deadline.is_expired() {
        return deadline.timeout_error();
    }
    match err.status() {
        Some(status) => HopError::Transport(format!("upstream returned status {}", status.as_u16())),
        None => HopError::Transport(err.to_string()),
    }
}

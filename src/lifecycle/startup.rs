//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the upstream fetcher from configuration
//! - Open the quotation database (schema created on open)
//! - Assemble the quotation service
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::config::RelayConfig;
use crate::service::{QuotationService, ServiceSettings};
use crate::storage::{QuotationStore, SqliteQuotationRepository, StorageError};
use crate::upstream::UpstreamFetcher;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid upstream URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    #[error("failed to build upstream client: {0}")]
    UpstreamClient(#[from] reqwest::Error),

    #[error("failed to open quotation database: {0}")]
    Storage(#[from] StorageError),
}

/// Build the quotation service described by `config`.
pub fn build_service(config: &RelayConfig) -> Result<QuotationService, StartupError> {
    let url = Url::parse(&config.upstream.url)?;
    let fetcher = UpstreamFetcher::new(url, config.upstream.pair_key.clone())?;
    tracing::info!(
        upstream = %fetcher.url(),
        pair_key = %config.upstream.pair_key,
        "Upstream fetcher ready"
    );

    let repository = SqliteQuotationRepository::open(&config.storage.database_path)?;
    tracing::info!(
        database_path = %config.storage.database_path,
        "Quotation database ready"
    );
    let store = QuotationStore::new(Arc::new(repository));

    let settings = ServiceSettings::from_config(config);
    tracing::info!(
        fetch_ms = config.timeouts.fetch_ms,
        persist_ms = config.timeouts.persist_ms,
        policy = ?settings.persistence_policy,
        "Quotation service assembled"
    );

    Ok(QuotationService::new(fetcher, store, settings))
}

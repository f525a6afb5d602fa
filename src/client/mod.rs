//! Relay client.
//!
//! # Responsibilities
//! - Issue one request to the relay endpoint under the client's own deadline
//! - Tell a client-side timeout apart from every other failure
//! - Write `label + body` to the output file on success
//!
//! # Design Decisions
//! - No retry, no backoff: any failure ends the run
//! - A non-2xx status is a failure and leaves no file behind

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::resilience::{Deadline, Hop};

/// Errors surfaced by a relay client run.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The relay did not answer within the client's budget.
    #[error("relay did not answer within {}ms", budget.as_millis())]
    Timeout { budget: Duration },

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("relay answered with status {0}")]
    UnexpectedStatus(u16),

    #[error("failed to write {}: {source}", path.display())]
    Sink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}

/// Bounded caller of the relay endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    endpoint: Url,
    budget: Duration,
}

impl RelayClient {
    pub fn new(endpoint: &str, budget: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().build().map_err(ClientError::Build)?;
        Self::with_client(http, endpoint, budget)
    }

    pub fn with_client(http: Client, endpoint: &str, budget: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            endpoint: Url::parse(endpoint)?,
            budget,
        })
    }

    /// Build a client for `config.endpoint_url` with the given outer budget.
    pub fn from_config(config: &ClientConfig, budget: Duration) -> Result<Self, ClientError> {
        Self::new(&config.endpoint_url, budget)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request the relay and return the raw response body.
    pub async fn fetch_raw(&self) -> Result<Vec<u8>, ClientError> {
        let deadline = Deadline::start(Hop::Relay, self.budget);
        tracing::debug!(
            endpoint = %self.endpoint,
            budget_ms = self.budget.as_millis() as u64,
            "Requesting relay"
        );

        match tokio::time::timeout_at(deadline.expires_at(), self.send()).await {
            Err(_) => Err(ClientError::Timeout {
                budget: self.budget,
            }),
            Ok(Err(ClientError::Transport(e))) if e.is_timeout() || deadline.is_expired() => {
                Err(ClientError::Timeout {
                    budget: self.budget,
                })
            }
            Ok(result) => result,
        }
    }

    async fn send(&self) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(ClientError::Transport)?;
        Ok(body.to_vec())
    }

    /// Fetch the relay and write `label + body` to `output`.
    pub async fn run(&self, output: &Path, label: &str) -> Result<(), ClientError> {
        let body = self.fetch_raw().await?;
        write_artifact(output, label, &body).await?;
        tracing::info!(path = %output.display(), bytes = body.len(), "Quotation written");
        Ok(())
    }
}

/// Write `label` followed by the raw `body`, replacing any existing file.
pub async fn write_artifact(path: &Path, label: &str, body: &[u8]) -> Result<(), ClientError> {
    let mut contents = Vec::with_capacity(label.len() + body.len());
    contents.extend_from_slice(label.as_bytes());
    contents.extend_from_slice(body);

    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ClientError::Sink {
            path: path.to_path_buf(),
            source,
        })
}

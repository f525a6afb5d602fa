//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the quotation relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Per-hop time budgets.
    pub timeouts: TimeoutConfig,

    /// Upstream quotation provider.
    pub upstream: UpstreamConfig,

    /// Quotation persistence.
    pub storage: StorageConfig,

    /// Relay client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Time budgets, one per hop, in milliseconds.
///
/// The budgets are independent: the persist budget is not carved out of the
/// fetch budget. Worst-case server latency is `fetch_ms + persist_ms`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outer deadline of the relay client's request.
    pub client_request_ms: u64,

    /// Deadline of the outbound upstream fetch.
    pub fetch_ms: u64,

    /// Deadline of the quotation row insert.
    pub persist_ms: u64,

    /// Server-side ceiling for a whole inbound request.
    pub handler_ceiling_ms: u64,
}

impl TimeoutConfig {
    pub fn client_request(&self) -> Duration {
        Duration::from_millis(self.client_request_ms)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_millis(self.fetch_ms)
    }

    pub fn persist(&self) -> Duration {
        Duration::from_millis(self.persist_ms)
    }

    pub fn handler_ceiling(&self) -> Duration {
        Duration::from_millis(self.handler_ceiling_ms)
    }

    /// Total server-side budget of the fetch and persist hops.
    pub fn server_budget_ms(&self) -> u64 {
        self.fetch_ms.saturating_add(self.persist_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request_ms: 300,
            fetch_ms: 200,
            persist_ms: 10,
            handler_ceiling_ms: 1000,
        }
    }
}

/// Upstream quotation provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Endpoint returning the latest quotation.
    pub url: String,

    /// Top-level key of the currency pair in the response body.
    pub pair_key: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "https://economia.awesomeapi.com.br/json/last/USD-BRL".to_string(),
            pair_key: "USDBRL".to_string(),
        }
    }
}

/// How a failed persistence hop affects the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Store failures are logged; the fetched quotation is still returned.
    #[default]
    BestEffort,
    /// Store failures fail the whole request.
    Strict,
}

/// Quotation persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: String,

    pub persistence_policy: PersistencePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "cotacao.db".to_string(),
            persistence_policy: PersistencePolicy::BestEffort,
        }
    }
}

/// Relay client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay endpoint to query.
    pub endpoint_url: String,

    /// File the response body is written to.
    pub output_path: String,

    /// Text written before the response body.
    pub label: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://localhost:8080/cotacao".to_string(),
            output_path: "cotacao.txt".to_string(),
            label: "Dólar: ".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format: "text" or "json".
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

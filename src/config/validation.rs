//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (budgets > 0)
//! - Check that budgets nest: client > fetch + persist, ceiling > fetch + persist
//! - Validate URLs and addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a [`RelayConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroBudget { field: &'static str },

    #[error(
        "timeouts.client_request_ms ({client_ms}) must exceed fetch_ms + persist_ms ({server_ms}) \
         or the client gives up before the server can answer"
    )]
    ClientBudgetTooTight { client_ms: u64, server_ms: u64 },

    #[error("timeouts.handler_ceiling_ms ({ceiling_ms}) must exceed fetch_ms + persist_ms ({server_ms})")]
    CeilingTooTight { ceiling_ms: u64, server_ms: u64 },

    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Check every semantic rule, collecting all failures.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let t = &config.timeouts;

    for (field, value) in [
        ("timeouts.client_request_ms", t.client_request_ms),
        ("timeouts.fetch_ms", t.fetch_ms),
        ("timeouts.persist_ms", t.persist_ms),
        ("timeouts.handler_ceiling_ms", t.handler_ceiling_ms),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroBudget { field });
        }
    }

    let server_ms = t.server_budget_ms();
    if t.client_request_ms <= server_ms {
        errors.push(ValidationError::ClientBudgetTooTight {
            client_ms: t.client_request_ms,
            server_ms,
        });
    }
    if t.handler_ceiling_ms <= server_ms {
        errors.push(ValidationError::CeilingTooTight {
            ceiling_ms: t.handler_ceiling_ms,
            server_ms,
        });
    }

    check_http_url("upstream.url", &config.upstream.url, &mut errors);
    check_http_url("client.endpoint_url", &config.client.endpoint_url, &mut errors);
    check_addr("listener.bind_address", &config.listener.bind_address, &mut errors);
    if config.observability.metrics_enabled {
        check_addr(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    for (field, value) in [
        ("upstream.pair_key", &config.upstream.pair_key),
        ("storage.database_path", &config.storage.database_path),
        ("client.output_path", &config.client.output_path),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme `{}`", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        }),
    }
}

fn check_addr(field: &'static str, raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: raw.to_string(),
        });
    }
}

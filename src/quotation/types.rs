//! Quotation record and upstream payload decoding.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::resilience::{HopError, Outcome};

/// One exchange-rate quotation as published by the upstream provider.
///
/// Every field is kept as the exact text the provider sent; numeric-looking
/// values are never parsed. Records are only built by [`decode_quotation`]
/// and have no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuotationRecord {
    code: String,
    #[serde(rename = "codein")]
    counter_code: String,
    name: String,
    high: String,
    low: String,
    #[serde(rename = "varBid")]
    variation: String,
    #[serde(rename = "pctChange")]
    percent_change: String,
    bid: String,
    ask: String,
    timestamp: String,
    create_date: String,
}

impl QuotationRecord {
    /// Base currency code (e.g. "USD").
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Quote currency code (e.g. "BRL").
    pub fn counter_code(&self) -> &str {
        &self.counter_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn variation(&self) -> &str {
        &self.variation
    }

    pub fn percent_change(&self) -> &str {
        &self.percent_change
    }

    pub fn bid(&self) -> &str {
        &self.bid
    }

    pub fn ask(&self) -> &str {
        &self.ask
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn create_date(&self) -> &str {
        &self.create_date
    }
}

/// Decode an upstream body of shape `{ "<pair_key>": { ... } }`.
///
/// Other top-level keys are ignored. Malformed JSON, a missing pair, a
/// missing field or a non-string leaf all yield [`HopError::Decode`].
pub fn decode_quotation(body: &[u8], pair_key: &str) -> Outcome<QuotationRecord> {
    let mut envelope: Map<String, Value> =
        serde_json::from_slice(body).map_err(|e| HopError::Decode(e.to_string()))?;

    let pair = envelope
        .remove(pair_key)
        .ok_or_else(|| HopError::Decode(format!("missing `{}` object", pair_key)))?;

    serde_json::from_value(pair).map_err(|e| HopError::Decode(format!("`{}`: {}", pair_key, e)))
}

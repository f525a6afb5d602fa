//! Hop outcome taxonomy.
//!
//! Every bounded hop of the relay chain returns an [`Outcome`]. The error side
//! tells the caller *why* the hop failed: a slow collaborator (`Timeout`) is
//! kept distinct from a broken one (`Transport`, `Decode`, `Store`).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// The bounded hops of the relay chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hop {
    /// Inbound request issued by the relay client.
    Relay,
    /// Outbound call to the upstream quotation provider.
    Fetch,
    /// Row insert into the quotation store.
    Persist,
}

impl Hop {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Hop::Relay => "relay",
            Hop::Fetch => "fetch",
            Hop::Persist => "persist",
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single hop.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HopError {
    /// The hop's deadline expired before it completed.
    #[error("{hop} hop timed out after {}ms", budget.as_millis())]
    Timeout { hop: Hop, budget: Duration },

    /// Connection or protocol failure unrelated to the deadline.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The persistence layer rejected or failed the write.
    #[error("store error: {0}")]
    Store(String),
}

impl HopError {
    /// Short label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            HopError::Timeout { .. } => "timeout",
            HopError::Transport(_) => "transport",
            HopError::Decode(_) => "decode",
            HopError::Store(_) => "store",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HopError::Timeout { .. })
    }
}

/// Result of a bounded hop.
pub type Outcome<T> = Result<T, HopError>;

/// Metrics label for an outcome: `success` or the failure kind.
pub fn outcome_label<T>(outcome: &Outcome<T>) -> &'static str {
    match outcome {
        Ok(_) => "success",
        Err(e) => e.kind(),
    }
}

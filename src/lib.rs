//! USD→BRL quotation relay library.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod quotation;
pub mod resilience;
pub mod service;
pub mod storage;
pub mod upstream;

pub use client::{ClientError, RelayClient};
pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use quotation::QuotationRecord;
pub use resilience::{Hop, HopError, Outcome};
pub use service::QuotationService;

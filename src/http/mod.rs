//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → relay.rs (/cotacao → QuotationService → bid or 500)
//!     → Send to client
//! ```

pub mod relay;
pub mod request;
pub mod server;

pub use relay::RELAY_PATH;
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};

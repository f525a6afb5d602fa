//! Quotation service layer.

pub mod quotation;

pub use quotation::{QuotationService, ServiceSettings};

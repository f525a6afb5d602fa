//! Quotation domain types.

pub mod types;

pub use types::{decode_quotation, QuotationRecord};

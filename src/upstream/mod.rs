//! Upstream quotation provider client.

pub mod fetcher;

pub use fetcher::UpstreamFetcher;

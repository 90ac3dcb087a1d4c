//! Fetch layer for retrieving source pages over HTTP.
//!
//! This module provides types and traits for:
//! - Fetched page representation ([`Page`])
//! - Abstracting page retrieval ([`PageFetcher`])
//! - Production fetcher implementation ([`ReqwestFetcher`])
//! - Error classification ([`FetchError`])

mod client;
mod error;
mod page;

pub use client::ReqwestFetcher;
pub use error::FetchError;
pub use page::{Page, PageFetcher};

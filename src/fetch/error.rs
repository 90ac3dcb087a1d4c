//! Error types for page fetching.

use thiserror::Error;

/// Error type for page fetch operations.
///
/// [`FetchError::is_transport`] separates failures that indicate a systemic
/// condition (no connectivity, stalled network) from failures tied to a
/// single source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and failures while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built for this URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Returns true if this failure should abort the whole poll cycle.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}

//! Fetched page type and fetcher trait.

use std::borrow::Cow;

use url::Url;

use super::FetchError;

/// A fetched page: response status plus the fully buffered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// HTTP status code.
    pub status: http::StatusCode,
    /// Response body.
    pub body: Vec<u8>,
}

impl Page {
    /// Creates a new page.
    #[must_use]
    pub const fn new(status: http::StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Creates a `200 OK` page with the given HTML.
    #[must_use]
    pub fn ok(html: impl Into<String>) -> Self {
        Self::new(http::StatusCode::OK, html.into().into_bytes())
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Trait for fetching source pages.
///
/// # Design
///
/// Abstracts the HTTP client so the poll engine can be driven by scripted
/// fetchers in tests. Non-2xx responses are returned as `Ok(Page)`; only
/// failures to obtain a response at all are errors.
///
/// # Example
///
/// ```ignore
/// use posting_listener::fetch::{FetchError, Page, PageFetcher};
/// use url::Url;
///
/// struct StaticFetcher(&'static str);
///
/// impl PageFetcher for StaticFetcher {
///     async fn fetch(&self, _url: &Url) -> Result<Page, FetchError> {
///         Ok(Page::ok(self.0))
///     }
/// }
/// ```
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its status and body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when:
    /// - The connection fails or the body cannot be read ([`FetchError::Connection`])
    /// - The request times out ([`FetchError::Timeout`])
    /// - The request cannot be built ([`FetchError::InvalidUrl`])
    fn fetch(&self, url: &Url) -> impl std::future::Future<Output = Result<Page, FetchError>> + Send;
}

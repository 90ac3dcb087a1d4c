//! Production page fetcher implementation using reqwest.

use std::time::Duration;

use url::Url;

use super::{FetchError, Page, PageFetcher};

/// Production page fetcher using reqwest.
///
/// Every request is bounded by a timeout so a stalled connection surfaces as
/// [`FetchError::Timeout`] instead of hanging a poll cycle.
///
/// # Example
///
/// ```no_run
/// use posting_listener::fetch::{PageFetcher, ReqwestFetcher};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = ReqwestFetcher::new(Duration::from_secs(30), "posting-listener")?;
/// let url = Url::parse("https://sfbay.craigslist.org/search/cta")?;
/// let page = fetcher.fetch(&url).await?;
/// println!("Status: {}", page.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    inner: reqwest::Client,
}

impl ReqwestFetcher {
    /// Creates a fetcher with the given per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Connection`] if the TLS backend or client
    /// configuration cannot be initialised.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Connection(Box::new(e)))?;

        Ok(Self { inner })
    }

}

impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let response = self
            .inner
            .get(url.as_str())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(Page::new(status, body))
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_builder() {
        FetchError::InvalidUrl(e.to_string())
    } else {
        FetchError::Connection(Box::new(e))
    }
}

//! Shared test fixtures for poll engine and listener tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use tokio::sync::Notify;
use url::Url;

use crate::fetch::{FetchError, Page, PageFetcher};
use crate::source::{ParseError, ParserTable, Posting, SiteKind, SiteParser};
use crate::time::Clock;

/// Site kind handled by [`LineParser`].
pub const TESTSITE: SiteKind = SiteKind::new("testsite");

/// Page body that [`LineParser`] rejects as structurally broken.
pub const BROKEN_PAGE: &str = "<redesigned>";

/// Parses one posting id per non-empty line, prefixed with `prefix`.
pub struct LineParser {
    pub site: SiteKind,
    pub prefix: &'static str,
}

impl SiteParser for LineParser {
    fn site(&self) -> SiteKind {
        self.site
    }

    fn parse(&self, page: &str, _page_url: Option<&Url>) -> Result<Vec<Posting>, ParseError> {
        if page.starts_with(BROKEN_PAGE) {
            return Err(ParseError::ContainerNotFound { selector: "lines" });
        }
        Ok(page
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(|l| Posting::new(format!("{}{l}", self.prefix)).with_title(format!("Posting {l}")))
            .collect())
    }
}

/// Parser table with only the [`TESTSITE`] line parser.
pub fn test_parsers() -> ParserTable {
    ParserTable::empty().with(LineParser {
        site: TESTSITE,
        prefix: "",
    })
}

/// Builds a page listing the given ids, one per line.
pub fn ids(ids: &[&str]) -> Result<Page, FetchError> {
    Ok(Page::ok(ids.join("\n")))
}

/// Returns the ids of `postings` in order.
pub fn ids_of(postings: &[Posting]) -> Vec<String> {
    postings.iter().map(|p| p.id.clone()).collect()
}

/// Fetcher returning scripted responses per URL.
///
/// Each URL has its own queue; once exhausted, an empty `200 OK` page is
/// returned. A single fetch of one URL can be gated on a [`Notify`] to hold
/// a cycle in flight.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, VecDeque<Result<Page, FetchError>>>>,
    calls: Mutex<Vec<String>>,
    gate: Mutex<Option<(String, Arc<Notify>)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a response for `url`.
    pub fn push(&self, url: &str, response: Result<Page, FetchError>) {
        self.pages
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Holds the next fetch of `url` until the returned notifier fires.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((url.to_string(), Arc::clone(&notify)));
        notify
    }

    /// Returns every URL fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns how many times `url` was fetched.
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == url).count()
    }

    fn take_gate(&self, url: &str) -> Option<Arc<Notify>> {
        let mut gate = self.gate.lock().unwrap();
        if gate.as_ref().is_some_and(|(gated, _)| gated == url) {
            gate.take().map(|(_, notify)| notify)
        } else {
            None
        }
    }

    fn next_response(&self, url: &str) -> Result<Page, FetchError> {
        self.pages
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Page::ok("")))
    }
}

impl PageFetcher for Arc<ScriptedFetcher> {
    async fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(notify) = self.take_gate(url.as_str()) {
            notify.notified().await;
        }
        self.next_response(url.as_str())
    }
}

/// Clock that advances by one minute on every read.
pub struct TickingClock {
    secs: AtomicU64,
}

impl TickingClock {
    pub const fn new() -> Self {
        Self {
            secs: AtomicU64::new(1_000_000),
        }
    }
}

impl Clock for TickingClock {
    fn now(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.secs.fetch_add(60, Ordering::SeqCst))
    }
}

//! Craigslist search result page parser.

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{ParseError, Posting, SiteKind, SiteParser, UNKNOWN};

#[cfg(test)]
#[path = "craigslist_tests.rs"]
mod tests;

const CONTAINER: &str = "ul.rows, #search-results";
const ROW: &str = "li.result-row";
const TITLE_LINK: &str = "a.result-title";
const PRICE: &str = ".result-price";
const DATE: &str = "time.result-date";

/// Trailing numeric post id in listing links, e.g. `/cto/d/acura-mdx/7301234567.html`.
const POST_ID_PATTERN: &str = r"/(\d+)\.html$";

/// Format of the `datetime` attribute on result dates.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parser for Craigslist search result pages (`li.result-row` markup).
///
/// Ids come from the title link's `data-id`, then the row's `data-pid`, then
/// the numeric suffix of the link. Rows without any id are dropped since
/// they cannot be deduplicated.
#[derive(Debug, Clone, Copy, Default)]
pub struct CraigslistParser;

impl CraigslistParser {
    /// Creates the parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn parse_row(
        row: ElementRef<'_>,
        sel: &RowSelectors,
        page_url: Option<&Url>,
    ) -> Option<Posting> {
        let title_link = row.select(&sel.title_link).next();

        let link = title_link
            .and_then(|a| a.value().attr("href"))
            .map(|href| resolve_link(page_url, href));

        let id = title_link
            .and_then(|a| a.value().attr("data-id"))
            .or_else(|| row.value().attr("data-pid"))
            .map(str::to_string)
            .or_else(|| link.as_deref().and_then(|l| sel.id_from_link(l)));

        let Some(id) = id else {
            tracing::debug!("Dropping Craigslist row without a post id");
            return None;
        };

        let title = title_link.map(collapsed_text).filter(|t| !t.is_empty());
        let price = row
            .select(&sel.price)
            .next()
            .map(collapsed_text)
            .filter(|p| !p.is_empty());
        let published_at = row
            .select(&sel.date)
            .next()
            .and_then(|t| t.value().attr("datetime"))
            .and_then(parse_datetime);

        let mut posting = Posting::new(id)
            .with_title(title.unwrap_or_else(|| UNKNOWN.to_string()))
            .with_price(price.unwrap_or_else(|| UNKNOWN.to_string()))
            .with_link(link.unwrap_or_else(|| UNKNOWN.to_string()));
        if let Some(at) = published_at {
            posting = posting.with_published_at(at);
        }
        Some(posting)
    }
}

impl SiteParser for CraigslistParser {
    fn site(&self) -> SiteKind {
        SiteKind::CRAIGSLIST
    }

    fn parse(&self, page: &str, page_url: Option<&Url>) -> Result<Vec<Posting>, ParseError> {
        let document = Html::parse_document(page);
        let container = selector(CONTAINER)?;
        let row = selector(ROW)?;
        let row_selectors = RowSelectors::new()?;

        let Some(container) = document.select(&container).next() else {
            return Err(ParseError::ContainerNotFound {
                selector: CONTAINER,
            });
        };

        Ok(container
            .select(&row)
            .filter_map(|r| Self::parse_row(r, &row_selectors, page_url))
            .collect())
    }
}

/// Selectors and patterns applied inside each result row.
struct RowSelectors {
    title_link: Selector,
    price: Selector,
    date: Selector,
    post_id: Regex,
}

impl RowSelectors {
    fn new() -> Result<Self, ParseError> {
        let post_id = Regex::new(POST_ID_PATTERN).map_err(|e| ParseError::InvalidPattern {
            pattern: POST_ID_PATTERN,
            reason: e.to_string(),
        })?;

        Ok(Self {
            title_link: selector(TITLE_LINK)?,
            price: selector(PRICE)?,
            date: selector(DATE)?,
            post_id,
        })
    }

    fn id_from_link(&self, link: &str) -> Option<String> {
        self.post_id
            .captures(link)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::InvalidSelector {
        selector: css,
        reason: e.to_string(),
    })
}

/// Joins an element's text nodes and collapses runs of whitespace.
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_link(page_url: Option<&Url>, href: &str) -> String {
    page_url
        .and_then(|base| base.join(href).ok())
        .map_or_else(|| href.to_string(), |u| u.to_string())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

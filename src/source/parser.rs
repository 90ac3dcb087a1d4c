//! Site parser trait and lookup table.

use thiserror::Error;
use url::Url;

use super::{CraigslistParser, Posting, SiteKind};

/// Error type for page parsing.
///
/// Every variant is scoped to a single page: a parse failure on one source
/// never affects the other sources polled in the same cycle.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The page does not contain the listing container at all, usually
    /// because the site changed its markup.
    #[error("Listing container '{selector}' not found")]
    ContainerNotFound {
        /// CSS selector that failed to match.
        selector: &'static str,
    },

    /// A CSS selector used by the parser is invalid.
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector text.
        selector: &'static str,
        /// Reason reported by the selector parser.
        reason: String,
    },

    /// A regular expression used by the parser is invalid.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text.
        pattern: &'static str,
        /// Reason reported by the regex compiler.
        reason: String,
    },

    /// No parser is registered for the requested site.
    #[error("No parser registered for site '{site}'")]
    NoParser {
        /// The site that was requested.
        site: SiteKind,
    },
}

/// Trait for site-specific page parsers.
///
/// # Contract
///
/// - Records are returned in page order.
/// - A record missing an optional field (title, price, link, date) is kept
///   with [`UNKNOWN`](super::UNKNOWN) in place of the missing value.
/// - Failing to locate the listing container is a hard [`ParseError`] for
///   this page only.
///
/// # Example
///
/// ```
/// use posting_listener::source::{ParseError, Posting, SiteKind, SiteParser};
/// use url::Url;
///
/// struct LinePerPosting;
///
/// impl SiteParser for LinePerPosting {
///     fn site(&self) -> SiteKind {
///         SiteKind::new("lines")
///     }
///
///     fn parse(&self, page: &str, _page_url: Option<&Url>) -> Result<Vec<Posting>, ParseError> {
///         Ok(page.lines().map(Posting::new).collect())
///     }
/// }
/// ```
pub trait SiteParser: Send + Sync {
    /// The site kind this parser handles.
    fn site(&self) -> SiteKind;

    /// Extracts postings from a fetched page body.
    ///
    /// `page_url` is the URL the body was fetched from, used to resolve
    /// relative links when available.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] when the page structure does not match.
    fn parse(&self, page: &str, page_url: Option<&Url>) -> Result<Vec<Posting>, ParseError>;
}

/// Lookup table of parsers keyed by [`SiteKind`].
///
/// Registration order is preserved and used when reporting known kinds.
/// Registering a second parser for the same kind replaces the first.
pub struct ParserTable {
    parsers: Vec<Box<dyn SiteParser>>,
}

impl ParserTable {
    /// Creates an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Adds a parser, replacing any parser for the same site.
    #[must_use]
    pub fn with(mut self, parser: impl SiteParser + 'static) -> Self {
        let site = parser.site();
        self.parsers.retain(|p| p.site() != site);
        self.parsers.push(Box::new(parser));
        self
    }

    /// Returns the registered site kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = SiteKind> + '_ {
        self.parsers.iter().map(|p| p.site())
    }

    /// Parses `page` with the parser registered for `site`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NoParser`] if `site` is not registered, or the
    /// parser's own error.
    pub fn parse(
        &self,
        site: SiteKind,
        page: &str,
        page_url: Option<&Url>,
    ) -> Result<Vec<Posting>, ParseError> {
        self.parsers
            .iter()
            .find(|p| p.site() == site)
            .ok_or(ParseError::NoParser { site })?
            .parse(page, page_url)
    }
}

impl Default for ParserTable {
    /// Creates a table with every built-in parser registered.
    fn default() -> Self {
        Self::empty().with(CraigslistParser::new())
    }
}

impl std::fmt::Debug for ParserTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

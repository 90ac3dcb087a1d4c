//! Site identification from source URLs.

use std::fmt;

use url::Url;

/// Identifier selecting which [`SiteParser`](super::SiteParser) handles a source.
///
/// The identifier is matched against the domain labels of a source URL, so
/// `SiteKind::CRAIGSLIST` matches `https://sfbay.craigslist.org/search/cta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteKind(&'static str);

impl SiteKind {
    /// Craigslist search result pages.
    pub const CRAIGSLIST: Self = Self("craigslist");

    /// Creates a site kind from a lowercase domain label.
    #[must_use]
    pub const fn new(identifier: &'static str) -> Self {
        Self(identifier)
    }

    /// Returns the domain label this kind matches.
    #[must_use]
    pub const fn identifier(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Outcome of matching a URL against the known site kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteResolution {
    /// No known site identifier appears among the URL's domain labels,
    /// or the URL has no host at all.
    NoMatch,

    /// Exactly one site matched.
    Unique(SiteKind),

    /// More than one site matched; `chosen` is the first in host-label order.
    Ambiguous {
        /// The kind the caller should use.
        chosen: SiteKind,
        /// Every kind that matched, in host-label order.
        candidates: Vec<SiteKind>,
    },
}

impl SiteResolution {
    /// Returns the kind to use, if any matched.
    #[must_use]
    pub const fn kind(&self) -> Option<SiteKind> {
        match self {
            Self::NoMatch => None,
            Self::Unique(kind) | Self::Ambiguous { chosen: kind, .. } => Some(*kind),
        }
    }
}

/// Matches the domain labels of `url` against `known` site kinds.
///
/// Labels are compared case-insensitively. A URL without a host resolves to
/// [`SiteResolution::NoMatch`].
pub fn resolve_site<I>(url: &Url, known: I) -> SiteResolution
where
    I: IntoIterator<Item = SiteKind>,
{
    let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
        return SiteResolution::NoMatch;
    };

    let known: Vec<SiteKind> = known.into_iter().collect();
    let mut candidates: Vec<SiteKind> = Vec::new();
    for label in host.split('.') {
        let matched = known
            .iter()
            .find(|k| k.identifier() == label && !candidates.contains(k));
        if let Some(kind) = matched {
            candidates.push(*kind);
        }
    }

    match candidates.as_slice() {
        [] => SiteResolution::NoMatch,
        [only] => SiteResolution::Unique(*only),
        [first, ..] => SiteResolution::Ambiguous {
            chosen: *first,
            candidates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKET: SiteKind = SiteKind::new("market");

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn matches_subdomain_label() {
        let resolution = resolve_site(
            &url("https://sfbay.craigslist.org/search/cta?query=acura"),
            [SiteKind::CRAIGSLIST],
        );

        assert_eq!(resolution, SiteResolution::Unique(SiteKind::CRAIGSLIST));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let resolution = resolve_site(
            &url("https://SFBAY.CraigsList.org/"),
            [SiteKind::CRAIGSLIST],
        );

        assert_eq!(resolution.kind(), Some(SiteKind::CRAIGSLIST));
    }

    #[test]
    fn path_segments_do_not_match() {
        let resolution = resolve_site(
            &url("https://example.org/craigslist/"),
            [SiteKind::CRAIGSLIST],
        );

        assert_eq!(resolution, SiteResolution::NoMatch);
    }

    #[test]
    fn partial_label_does_not_match() {
        let resolution = resolve_site(&url("https://notcraigslist.org/"), [SiteKind::CRAIGSLIST]);

        assert_eq!(resolution, SiteResolution::NoMatch);
    }

    #[test]
    fn hostless_url_is_no_match() {
        let resolution = resolve_site(
            &url("data:text/plain,craigslist"),
            [SiteKind::CRAIGSLIST],
        );

        assert_eq!(resolution, SiteResolution::NoMatch);
    }

    #[test]
    fn multiple_matches_pick_first_host_label() {
        let resolution = resolve_site(
            &url("https://market.craigslist.org/"),
            [SiteKind::CRAIGSLIST, MARKET],
        );

        assert_eq!(
            resolution,
            SiteResolution::Ambiguous {
                chosen: MARKET,
                candidates: vec![MARKET, SiteKind::CRAIGSLIST],
            }
        );
        assert_eq!(resolution.kind(), Some(MARKET));
    }

    #[test]
    fn display_shows_identifier() {
        assert_eq!(SiteKind::CRAIGSLIST.to_string(), "craigslist");
    }
}

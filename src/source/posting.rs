//! Core posting type.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sentinel used for fields a parser could not extract from a record.
pub const UNKNOWN: &str = "unknown";

/// A single listing extracted from a source page.
///
/// # Identity
///
/// Deduplication only looks at [`Posting::id`]. Two postings with the same id
/// are the same listing even if their title or price changed between polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Identifier of the listing on its source site.
    pub id: String,
    /// Listing title, or [`UNKNOWN`].
    pub title: String,
    /// Price as displayed on the page (currency symbol included), or [`UNKNOWN`].
    pub price: String,
    /// Absolute or site-relative link to the listing, or [`UNKNOWN`].
    pub link: String,
    /// Publication time as reported by the site, if present.
    pub published_at: Option<NaiveDateTime>,
}

impl Posting {
    /// Creates a posting with only an id; every other field is [`UNKNOWN`].
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: UNKNOWN.to_string(),
            price: UNKNOWN.to_string(),
            link: UNKNOWN.to_string(),
            published_at: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the price.
    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    /// Sets the link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Sets the publication time.
    #[must_use]
    pub const fn with_published_at(mut self, published_at: NaiveDateTime) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Returns the publication time formatted for display, or [`UNKNOWN`].
    #[must_use]
    pub fn published_display(&self) -> String {
        self.published_at.map_or_else(
            || UNKNOWN.to_string(),
            |at| at.format("%Y-%m-%d %H:%M").to_string(),
        )
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.id, self.title, self.price)
    }
}

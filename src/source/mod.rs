//! Source layer: what gets polled and how pages turn into postings.
//!
//! This module provides types and traits for:
//! - Representing extracted listings ([`Posting`])
//! - Tracking named poll targets ([`Source`], [`SourceRegistry`])
//! - Selecting a parser from a URL ([`SiteKind`], [`resolve_site`])
//! - Parsing fetched pages ([`SiteParser`], [`ParserTable`], [`ParseError`])
//! - The built-in Craigslist search-page parser ([`CraigslistParser`])

mod craigslist;
mod parser;
mod posting;
mod registry;
mod site;

pub use craigslist::CraigslistParser;
pub use parser::{ParseError, ParserTable, SiteParser};
pub use posting::{Posting, UNKNOWN};
pub use registry::{RegistryError, Source, SourceRegistry, SourceTable};
pub use site::{SiteKind, SiteResolution, resolve_site};

//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

/// Default base delay between poll cycles in seconds.
pub const POLL_INTERVAL_SECS: u64 = 420;

/// Default lower jitter bound added to the poll interval, in seconds.
pub const JITTER_MIN_SECS: i64 = -10;

/// Default upper jitter bound added to the poll interval, in seconds.
pub const JITTER_MAX_SECS: i64 = 60;

/// Default per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` header sent with every page request.
pub const USER_AGENT: &str = concat!("posting-listener/", env!("CARGO_PKG_VERSION"));

/// Default owner store path.
pub const STORE_PATH: &str = "posting-listener.json";

/// Default owner whose sources the CLI subcommands manage.
pub const OWNER: &str = "default";

/// Default interval between sink drains in seconds.
pub const DRAIN_INTERVAL_SECS: u64 = 25;

/// Default notification template.
///
/// Available variables: `{{id}}`, `{{title}}`, `{{price}}`, `{{link}}`,
/// `{{published}}`, `{{owner}}`.
pub const TEMPLATE: &str = "Title: {{title}}\nPrice: {{price}}\nLink: {{link}}\nDate: {{published}}\n";

/// Default request timeout as Duration.
#[must_use]
pub const fn request_timeout() -> Duration {
    Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

/// Default drain interval as Duration.
#[must_use]
pub const fn drain_interval() -> Duration {
    Duration::from_secs(DRAIN_INTERVAL_SECS)
}

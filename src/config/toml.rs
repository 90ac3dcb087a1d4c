//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;
use crate::source::SourceTable;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Polling and request settings
    #[serde(default)]
    pub listener: ListenerSection,

    /// Owner store settings
    #[serde(default)]
    pub store: StoreSection,

    /// Notification rendering settings
    #[serde(default)]
    pub notify: NotifySection,

    /// Sources registered for the configured owner when the store has none
    #[serde(default)]
    pub sources: SourceTable,
}

/// Polling and request configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListenerSection {
    /// Base delay between polls in seconds
    pub poll_interval: Option<u64>,

    /// Lower jitter bound in seconds (may be negative)
    pub jitter_min: Option<i64>,

    /// Upper jitter bound in seconds
    pub jitter_max: Option<i64>,

    /// Per-request timeout in seconds
    pub request_timeout: Option<u64>,

    /// `User-Agent` header for page requests
    pub user_agent: Option<String>,
}

/// Owner store configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Store file path; a leading `~` is expanded to the home directory
    pub path: Option<String>,

    /// Owner managed by the CLI subcommands
    pub owner: Option<String>,
}

/// Notification configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Handlebars template rendered once per new posting
    pub template: Option<String>,

    /// Seconds between sink drains
    pub drain_interval: Option<u64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# posting-listener configuration file

[listener]
# Base delay between polls in seconds (default: 420)
poll_interval = 420

# Uniform jitter added to every delay, in seconds (default: -10 to 60)
# jitter_min = -10
# jitter_max = 60

# Per-request timeout in seconds (default: 30)
# request_timeout = 30

# User-Agent header for page requests
# user_agent = "posting-listener"

[store]
# Where each owner's sources are saved (default: posting-listener.json)
# path = "~/.posting-listener/store.json"

# Owner managed by the add/remove/list subcommands (default: "default")
# owner = "default"

[notify]
# Handlebars template rendered for every new posting
# Available variables: {{id}}, {{title}}, {{price}}, {{link}}, {{published}}, {{owner}}
# template = "{{title}} ({{price}}) {{link}}"

# Seconds between checks for new postings to print (default: 25)
# drain_interval = 25

[sources]
# Registered for the configured owner on first run, when the store is empty
# "Acura MDX" = "https://sfbay.craigslist.org/search/cta?query=acura+mdx"
"#
    .to_string()
}

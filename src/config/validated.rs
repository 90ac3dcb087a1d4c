//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use handlebars::Handlebars;
use url::Url;

use crate::monitor::PollSchedule;
use crate::source::SourceTable;

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Delay policy between poll cycles
    pub schedule: PollSchedule,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// `User-Agent` header for page requests
    pub user_agent: String,

    /// Owner store file path, with `~` expanded
    pub store_path: PathBuf,

    /// Owner managed by the CLI subcommands
    pub owner: String,

    /// Sources seeded for `owner` when the store has none
    pub seed_sources: SourceTable,

    /// Handlebars notification template (syntax already checked)
    pub template: String,

    /// Interval between sink drains
    pub drain_interval: Duration,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (jitter_min, jitter_max) = self.schedule.jitter();
        write!(
            f,
            "Config {{ poll_interval: {}s, jitter: {jitter_min}s..{jitter_max}s, \
             request_timeout: {}s, store: {}, owner: {}, seed_sources: {}, drain: {}s }}",
            self.schedule.base().as_secs(),
            self.request_timeout.as_secs(),
            self.store_path.display(),
            self.owner,
            self.seed_sources.len(),
            self.drain_interval.as_secs(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A duration is zero
    /// - The jitter bounds are reversed
    /// - The owner or user agent is empty
    /// - A seed source URL is not an http(s) URL
    /// - The notification template does not compile
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let schedule = Self::resolve_schedule(cli, toml)?;

        let request_timeout = non_zero_secs(
            "request_timeout",
            cli.request_timeout
                .or_else(|| toml.and_then(|t| t.listener.request_timeout))
                .unwrap_or(defaults::REQUEST_TIMEOUT_SECS),
        )?;

        let user_agent = non_empty(
            "user_agent",
            toml.and_then(|t| t.listener.user_agent.as_deref())
                .unwrap_or(defaults::USER_AGENT),
        )?;

        let owner = non_empty(
            "owner",
            cli.owner
                .as_deref()
                .or_else(|| toml.and_then(|t| t.store.owner.as_deref()))
                .unwrap_or(defaults::OWNER),
        )?;

        let store_path = Self::resolve_store_path(cli, toml);

        let seed_sources = toml.map(|t| t.sources.clone()).unwrap_or_default();
        for url in seed_sources.values() {
            validate_source_url(url)?;
        }

        let template = toml
            .and_then(|t| t.notify.template.clone())
            .unwrap_or_else(|| defaults::TEMPLATE.to_string());
        validate_template(&template)?;

        let drain_interval = non_zero_secs(
            "drain_interval",
            toml.and_then(|t| t.notify.drain_interval)
                .unwrap_or(defaults::DRAIN_INTERVAL_SECS),
        )?;

        Ok(Self {
            schedule,
            request_timeout,
            user_agent,
            store_path,
            owner,
            seed_sources,
            template,
            drain_interval,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = match cli.config {
            Some(ref path) => Some(TomlConfig::load(path)?),
            None => None,
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_schedule(cli: &Cli, toml: Option<&TomlConfig>) -> Result<PollSchedule, ConfigError> {
        let listener = toml.map(|t| &t.listener);

        // Priority: CLI explicit > TOML > default
        let base = non_zero_secs(
            "poll_interval",
            cli.poll_interval
                .or_else(|| listener.and_then(|l| l.poll_interval))
                .unwrap_or(defaults::POLL_INTERVAL_SECS),
        )?;

        let min = listener
            .and_then(|l| l.jitter_min)
            .unwrap_or(defaults::JITTER_MIN_SECS);
        let max = listener
            .and_then(|l| l.jitter_max)
            .unwrap_or(defaults::JITTER_MAX_SECS);
        if min > max {
            return Err(ConfigError::InvalidJitter { min, max });
        }

        Ok(PollSchedule::new(base).with_jitter(min, max))
    }

    fn resolve_store_path(cli: &Cli, toml: Option<&TomlConfig>) -> PathBuf {
        if let Some(ref path) = cli.store {
            return expand_home(&path.to_string_lossy());
        }

        let raw = toml
            .and_then(|t| t.store.path.as_deref())
            .unwrap_or(defaults::STORE_PATH);
        expand_home(raw)
    }
}

/// Checks that `url` is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] describing the first problem found.
pub fn validate_source_url(url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected http or https",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(parsed)
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

// Helper functions

fn validate_template(template: &str) -> Result<(), ConfigError> {
    let mut hbs = Handlebars::new();
    hbs.register_template_string("notification", template)
        .map_err(|e| ConfigError::InvalidTemplate {
            reason: e.to_string(),
        })
}

fn non_zero_secs(field: &'static str, seconds: u64) -> Result<Duration, ConfigError> {
    if seconds == 0 {
        return Err(ConfigError::InvalidDuration {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(Duration::from_secs(seconds))
}

fn non_empty(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue { field });
    }
    Ok(trimmed.to_string())
}

/// Expands a leading `~` to the home directory; other paths are unchanged.
fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(raw),
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(raw),
    }
}

//! Process-level glue for the binary: exit statuses, log output and the
//! hints printed after a configuration failure.

use posting_listener::config::ConfigError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit statuses reported to the shell.
pub mod exit_code {
    use std::process::ExitCode;

    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Bad flags, an unreadable or invalid config file, or a rejected URL.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Status for failures after startup, such as an unknown source name or
    /// a store that cannot be written.
    const RUNTIME_FAILURE: u8 = 2;

    pub fn runtime_error() -> ExitCode {
        ExitCode::from(RUNTIME_FAILURE)
    }
}

/// Returns a follow-up hint for `error`, if one would help.
pub fn config_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::FileRead { .. } | ConfigError::TomlParse(_) => {
            Some("Run 'posting-listener init' to generate a configuration template.")
        }
        ConfigError::InvalidUrl { .. } => {
            Some("Source URLs must be absolute http(s) search result page URLs.")
        }
        ConfigError::InvalidJitter { .. } => {
            Some("Jitter bounds are seconds added to poll_interval; jitter_min may be negative.")
        }
        ConfigError::InvalidTemplate { .. } => Some(
            "Templates use Handlebars syntax with owner, id, title, price, link and published.",
        ),
        _ => None,
    }
}

pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

/// Installs the global subscriber. Logs go to stderr so rendered postings
/// on stdout stay clean; `RUST_LOG` overrides the level picked here.
pub fn setup_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_config_points_at_init() {
        let error = ConfigError::FileRead {
            path: "missing.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        assert!(config_hint(&error).unwrap().contains("posting-listener init"));
    }

    #[test]
    fn reversed_jitter_has_a_hint() {
        let error = ConfigError::InvalidJitter { min: 60, max: -10 };

        assert!(config_hint(&error).unwrap().contains("jitter_min"));
    }

    #[test]
    fn empty_value_has_no_hint() {
        let error = ConfigError::EmptyValue { field: "owner" };

        assert_eq!(config_hint(&error), None);
    }
}

//! Configuration layer for posting-listener.
//!
//! This module provides:
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ValidatedConfig`])
//! - Configuration file generation ([`write_default_config`])
//! - Source URL validation for the `add` subcommand ([`validate_source_url`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Values explicitly passed via command line
//! 2. **TOML config file** - Values from the configuration file
//! 3. **Built-in defaults** - Hardcoded default values
//!
//! # TOML-Only Options
//!
//! - `listener.jitter_min` / `listener.jitter_max` (default: -10s / +60s)
//! - `listener.user_agent`
//! - `notify.template` and `notify.drain_interval` (default: 25s)
//! - The `[sources]` seed table, used for the configured owner only when the
//!   store holds no sources for that owner

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;


pub use cli::{Cli, Command};
pub use error::ConfigError;
pub use toml::{TomlConfig, default_config_template};
pub use validated::{ValidatedConfig, validate_source_url, write_default_config};

//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// posting-listener: classified listing watcher
///
/// Polls search result pages on a jittered schedule and prints postings
/// that were not there on the previous poll.
#[derive(Debug, Parser)]
#[command(name = "posting-listener")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the owner store file
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Owner whose sources `add`, `remove` and `list` manage
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Base delay between polls in seconds
    #[arg(long = "poll-interval", global = true)]
    pub poll_interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long = "request-timeout", global = true)]
    pub request_timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for posting-listener
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "posting-listener.toml")]
        output: PathBuf,
    },

    /// Register a search page under a name
    Add {
        /// Unique name for the source
        name: String,
        /// Search results page URL
        url: String,
    },

    /// Deregister a source
    Remove {
        /// Name of the source to remove
        name: String,
    },

    /// List registered sources
    List,

    /// Poll every owner's sources until interrupted
    Run,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the subcommand, treating a missing one as [`Command::Run`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }
}

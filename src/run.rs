//! Application execution logic.
//!
//! This module contains the source-management subcommands, which edit the
//! owner store, and the `run` loop that restores one listener per owner and
//! prints new postings until shutdown.

use std::time::Duration;

use thiserror::Error;
use tokio::signal;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

use posting_listener::config::{Command, ConfigError, ValidatedConfig, validate_source_url};
use posting_listener::fetch::{FetchError, ReqwestFetcher};
use posting_listener::monitor::{Listener, PostingSink};
use posting_listener::source::{RegistryError, Source, SourceRegistry, SourceTable};
use posting_listener::state::{FileOwnerStore, LoadResult, OwnerStore, OwnerTables, StateError};

use crate::notify::Notifier;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The URL given to `add` is not a usable http(s) URL.
    #[error(transparent)]
    InvalidUrl(#[from] ConfigError),

    /// The source name is taken or unknown.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Failed to save the owner store.
    #[error("Failed to save sources: {0}")]
    StateSave(#[source] StateError),

    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(#[source] FetchError),

    /// The notification template failed to compile.
    #[error("Invalid notification template: {0}")]
    Template(#[source] Box<handlebars::TemplateError>),
}

/// One running listener and the sink it delivers to.
struct OwnerListener {
    owner: String,
    listener: Listener<ReqwestFetcher>,
    sink: PostingSink,
}

/// Executes `command` against the configured store.
///
/// # Errors
///
/// Returns an error if a subcommand is rejected, the store cannot be saved,
/// or the runtime dependencies of `run` cannot be built.
#[cfg(not(tarpaulin_include))]
pub async fn execute(command: Command, config: ValidatedConfig) -> Result<(), RunError> {
    let store = FileOwnerStore::new(&config.store_path);
    tracing::debug!("Using owner store {}", store.path().display());

    match command {
        Command::Add { name, url } => {
            let source = add_source(&store, &config.owner, name, &url).await?;
            println!("Added '{}' for {}: {}", source.name, config.owner, source.url);
        }
        Command::Remove { name } => {
            let source = remove_source(&store, &config.owner, &name).await?;
            println!("Removed '{}' for {}", source.name, config.owner);
        }
        Command::List => print_sources(&config.owner, &list_sources(&store, &config.owner)),
        Command::Run => run_listeners(&store, &config).await?,
        Command::Init { .. } => {}
    }

    Ok(())
}

/// Loads every owner's sources, seeding `owner` from the config file when
/// the store has nothing for it.
fn load_tables(store: &impl OwnerStore, owner: &str, seed: &SourceTable) -> OwnerTables {
    let mut tables = match store.load() {
        LoadResult::Loaded(tables) => tables,
        LoadResult::NotFound => {
            tracing::info!("No saved sources found, starting fresh");
            OwnerTables::new()
        }
        LoadResult::Corrupted { reason } => {
            tracing::warn!("Owner store corrupted ({reason}), will overwrite on next save");
            OwnerTables::new()
        }
    };

    if !seed.is_empty() {
        let table = tables.entry(owner.to_string()).or_default();
        if table.is_empty() {
            tracing::info!("Seeding {} source(s) for {owner} from config", seed.len());
            table.clone_from(seed);
        }
    }

    tables
}

/// Registers a validated source for `owner` and saves the store.
async fn add_source(
    store: &impl OwnerStore,
    owner: &str,
    name: String,
    url: &str,
) -> Result<Source, RunError> {
    validate_source_url(url)?;

    let mut tables = load_tables(store, owner, &SourceTable::new());
    let mut registry = SourceRegistry::from_table(&tables.get(owner).cloned().unwrap_or_default());
    registry.add(name.clone(), url)?;
    tables.insert(owner.to_string(), registry.list());

    store.save(&tables).await.map_err(RunError::StateSave)?;
    tracing::info!("Saved source '{name}' for {owner}");
    Ok(Source::new(name, url))
}

/// Deregisters a source for `owner` and saves the store.
async fn remove_source(
    store: &impl OwnerStore,
    owner: &str,
    name: &str,
) -> Result<Source, RunError> {
    let mut tables = load_tables(store, owner, &SourceTable::new());
    let mut registry = SourceRegistry::from_table(&tables.get(owner).cloned().unwrap_or_default());
    let removed = registry.remove(name)?;

    let remaining = registry.list();
    if remaining.is_empty() {
        tables.remove(owner);
    } else {
        tables.insert(owner.to_string(), remaining);
    }

    store.save(&tables).await.map_err(RunError::StateSave)?;
    tracing::info!("Removed source '{name}' for {owner}");
    Ok(removed)
}

/// Returns the sources registered for `owner`.
fn list_sources(store: &impl OwnerStore, owner: &str) -> SourceTable {
    load_tables(store, owner, &SourceTable::new())
        .remove(owner)
        .unwrap_or_default()
}

fn print_sources(owner: &str, table: &SourceTable) {
    if table.is_empty() {
        println!("No sources registered for {owner}");
        return;
    }
    for (name, url) in table {
        println!("{name}: {url}");
    }
}

/// Starts one listener per owner and prints new postings until shutdown.
///
/// Excluded from coverage - requires network access and signal handling.
#[cfg(not(tarpaulin_include))]
async fn run_listeners(store: &impl OwnerStore, config: &ValidatedConfig) -> Result<(), RunError> {
    let notifier = Notifier::new(&config.template).map_err(|e| RunError::Template(Box::new(e)))?;
    let fetcher = ReqwestFetcher::new(config.request_timeout, &config.user_agent)
        .map_err(RunError::ClientCreation)?;

    let tables = load_tables(store, &config.owner, &config.seed_sources);
    let listeners: Vec<OwnerListener> = tables
        .into_iter()
        .filter(|(_, table)| !table.is_empty())
        .map(|(owner, table)| {
            let listener = Listener::builder(fetcher.clone())
                .sources(&table)
                .schedule(config.schedule.clone())
                .build();
            OwnerListener {
                owner,
                listener,
                sink: PostingSink::new(),
            }
        })
        .collect();

    if listeners.is_empty() {
        tracing::warn!("No sources registered; add one with 'posting-listener add <NAME> <URL>'");
        return Ok(());
    }

    for entry in &listeners {
        tracing::info!("Starting listener for {}", entry.owner);
        entry.listener.start(Some(entry.sink.clone()));
    }

    drain_until_shutdown(&listeners, &notifier, config.drain_interval).await;

    for entry in &listeners {
        entry.listener.stop();
    }
    // Postings committed by a cycle that finished while shutting down.
    deliver(&listeners, &notifier);
    Ok(())
}

#[cfg(not(tarpaulin_include))]
async fn drain_until_shutdown(listeners: &[OwnerListener], notifier: &Notifier, every: Duration) {
    let mut ticks = IntervalStream::new(tokio::time::interval(every));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return;
            }

            Some(_) = ticks.next() => deliver(listeners, notifier),
        }
    }
}

/// Drains every sink and prints the rendered postings.
fn deliver(listeners: &[OwnerListener], notifier: &Notifier) {
    for entry in listeners {
        let postings = entry.sink.drain();
        if postings.is_empty() {
            continue;
        }
        tracing::info!("{} new posting(s) for {}", postings.len(), entry.owner);
        for posting in &postings {
            match notifier.render(&entry.owner, posting) {
                Ok(text) => println!("{text}"),
                Err(e) => tracing::error!("Failed to render posting {}: {e}", posting.id),
            }
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

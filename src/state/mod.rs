//! Persistence of each owner's source table across restarts.
//!
//! Dedup state is never persisted; only the `owner → {name → url}` tables
//! are, so listeners can be rebuilt on startup.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileOwnerStore;

use std::collections::BTreeMap;
use std::io;

use thiserror::Error;

use crate::source::SourceTable;

/// Source tables keyed by owner.
pub type OwnerTables = BTreeMap<String, SourceTable>;

/// Result of loading owner tables from persistent storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Tables were loaded.
    Loaded(OwnerTables),

    /// No store file exists yet.
    NotFound,

    /// A store file exists but could not be read or parsed.
    /// Callers start empty; the next save overwrites it.
    Corrupted {
        /// What went wrong, for logging.
        reason: String,
    },
}

/// Errors saving owner tables.
///
/// Read-side problems are reported through [`LoadResult`] instead.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write the store file.
    #[error("Failed to write store file: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the tables.
    #[error("Failed to serialize owner tables: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The background write task did not complete.
    #[error("Store write task failed: {0}")]
    Task(#[source] tokio::task::JoinError),
}

/// Storage for owner source tables.
///
/// Implementations write atomically and treat a missing or unreadable file
/// as a recoverable condition.
pub trait OwnerStore: Send + Sync {
    /// Loads the saved tables.
    fn load(&self) -> LoadResult;

    /// Replaces the saved tables with `tables`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables cannot be written.
    fn save(
        &self,
        tables: &OwnerTables,
    ) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}

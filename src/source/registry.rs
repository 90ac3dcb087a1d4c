//! Named poll targets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

/// Plain `name → url` table, as listed to callers and persisted by owners.
pub type SourceTable = BTreeMap<String, String>;

/// Error type for registry operations.
///
/// These are never fatal; they are returned to the caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A source with this name is already registered.
    #[error("Source '{name}' already exists")]
    AlreadyExists {
        /// The duplicate name.
        name: String,
    },

    /// No source with this name is registered.
    #[error("Source '{name}' not found")]
    NotFound {
        /// The missing name.
        name: String,
    },
}

/// A named page to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Name chosen by the owner, unique within a registry.
    pub name: String,
    /// Page URL. Not validated here; bad URLs surface when polled.
    pub url: String,
}

impl Source {
    /// Creates a new source.
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Registration-ordered set of uniquely named sources.
///
/// Iteration order is the order sources were added, which is also the order
/// a poll cycle visits them.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Creates a registry from a persisted table.
    ///
    /// Sources are registered in the table's iteration order.
    #[must_use]
    pub fn from_table(table: &SourceTable) -> Self {
        Self {
            sources: table
                .iter()
                .map(|(name, url)| Source::new(name.clone(), url.clone()))
                .collect(),
        }
    }

    /// Registers a source.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyExists`] if `name` is taken; the
    /// registry is left unchanged.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::AlreadyExists { name });
        }
        self.sources.push(Source::new(name, url));
        Ok(())
    }

    /// Deregisters a source and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no source has that name.
    pub fn remove(&mut self, name: &str) -> Result<Source, RegistryError> {
        let index = self
            .sources
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;
        Ok(self.sources.remove(index))
    }

    /// Returns a `name → url` snapshot.
    #[must_use]
    pub fn list(&self) -> SourceTable {
        self.sources
            .iter()
            .map(|s| (s.name.clone(), s.url.clone()))
            .collect()
    }

    /// Returns a snapshot of all sources in registration order.
    #[must_use]
    pub fn sources(&self) -> Vec<Source> {
        self.sources.clone()
    }

    /// Returns true if a source with that name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name == name)
    }
}

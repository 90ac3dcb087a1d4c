//! JSON file owner store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use super::{LoadResult, OwnerStore, OwnerTables, StateError};

/// Store file format version. Other versions load as corrupted.
const STORE_FILE_VERSION: u32 = 1;

/// On-disk layout.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,

    /// Unix seconds at save time, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<u64>,

    #[serde(default)]
    owners: OwnerTables,
}

impl StoreFile {
    fn new(owners: &OwnerTables) -> Self {
        let saved_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .ok();
        Self {
            version: STORE_FILE_VERSION,
            saved_at,
            owners: owners.clone(),
        }
    }
}

/// [`OwnerStore`] backed by a pretty-printed JSON file.
///
/// Saves go to `{path}.tmp` first and are then renamed over `path`, so a
/// crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct FileOwnerStore {
    path: PathBuf,
}

impl FileOwnerStore {
    /// Creates a store at `path`. Nothing is touched until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomically(path: &Path, file: &StoreFile) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(file).map_err(StateError::Serialize)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StateError::Write)?;
        }

        // store.json -> store.json.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));
        std::fs::write(&temp_path, content).map_err(StateError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StateError::Write)
    }
}

impl OwnerStore for FileOwnerStore {
    fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match serde_json::from_str::<StoreFile>(&content) {
            Ok(file) if file.version == STORE_FILE_VERSION => LoadResult::Loaded(file.owners),
            Ok(file) => LoadResult::Corrupted {
                reason: format!(
                    "Incompatible version: expected {STORE_FILE_VERSION}, got {}",
                    file.version
                ),
            },
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            },
        }
    }

    async fn save(&self, tables: &OwnerTables) -> Result<(), StateError> {
        let path = self.path.clone();
        let file = StoreFile::new(tables);

        tokio::task::spawn_blocking(move || Self::write_atomically(&path, &file))
            .await
            .map_err(StateError::Task)?
    }
}

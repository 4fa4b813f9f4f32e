//! JSON blob storage, one file per tool.
//!
//! Each tool owns a single storage key. Loading a missing key yields the
//! tool's default state; saving replaces the whole blob.

use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::data_dir;
use crate::error::{Result, StorageError};

/// Storage key of each tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKey {
    Calendar,
    Housing,
    Health,
    SampleSize,
    Qr,
    Todo,
}

impl ToolKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKey::Calendar => "calendar",
            ToolKey::Housing => "housing",
            ToolKey::Health => "health",
            ToolKey::SampleSize => "sample_size",
            ToolKey::Qr => "qr",
            ToolKey::Todo => "todo",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for ToolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed handle on one tool's JSON file.
pub struct JsonStore<T> {
    path: PathBuf,
    _state: PhantomData<T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Open the store for `tool` inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open(tool: ToolKey) -> Result<Self> {
        Ok(Self::with_path(data_dir()?.join(tool.file_name())))
    }

    /// Store backed by an explicit file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the stored state, or the default if nothing was saved yet.
    ///
    /// # Errors
    /// Returns [`StorageError::Corrupt`] if the file exists but does not
    /// parse, or an IO error if it cannot be read.
    pub fn load(&self) -> Result<T> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored state, using defaults");
                return Ok(T::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default(&self) -> T {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "stored state unreadable, starting from defaults");
            T::default()
        })
    }

    /// Replace the stored blob with `state`.
    ///
    /// Writes to a sibling temporary file first so a failed write never
    /// leaves a truncated blob behind.
    ///
    /// # Errors
    /// Returns [`StorageError::SaveFailed`] if serialization or the write fails.
    pub fn save(&self, state: &T) -> Result<()> {
        let save_failed = |message: String| StorageError::SaveFailed {
            path: self.path.clone(),
            message,
        };
        let content =
            serde_json::to_string_pretty(state).map_err(|e| save_failed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(|e| save_failed(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| save_failed(e.to_string()))?;
        info!(path = %self.path.display(), "state saved");
        Ok(())
    }

    /// Remove the stored blob. Missing files are not an error.
    ///
    /// # Errors
    /// Returns an IO error if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "state cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use tempfile::TempDir;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Blob {
        items: Vec<String>,
    }

    #[test]
    fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store: JsonStore<Blob> = JsonStore::with_path(dir.path().join("blob.json"));
        assert_eq!(store.load().unwrap(), Blob::default());
        assert!(!store.exists());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_path(dir.path().join("blob.json"));
        let blob = Blob {
            items: vec!["a".into(), "b".into()],
        };
        store.save(&blob).unwrap();
        assert_eq!(store.load().unwrap(), blob);
        assert!(!dir.path().join("blob.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_reported_but_default_is_available() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store: JsonStore<Blob> = JsonStore::with_path(&path);
        assert!(matches!(
            store.load(),
            Err(CoreError::Storage(StorageError::Corrupt { .. }))
        ));
        assert_eq!(store.load_or_default(), Blob::default());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_path(dir.path().join("blob.json"));
        store.save(&Blob::default()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn tool_keys_map_to_files() {
        assert_eq!(ToolKey::SampleSize.file_name(), "sample_size.json");
        assert_eq!(ToolKey::Todo.to_string(), "todo");
    }
}

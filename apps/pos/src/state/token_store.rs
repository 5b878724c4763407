//! # Token Store
//!
//! Client-side persistence for the bearer token: exactly one value under
//! [`TOKEN_STORAGE_KEY`].
//!
//! ```text
//! ┌───────────────────────┐      ┌───────────────────────────────────────┐
//! │   MemoryTokenStore    │      │           FileTokenStore              │
//! │   (tests, kiosks)     │      │  <app data>/session.json              │
//! │                       │      │  { "token": "eyJhbGciOi..." }         │
//! └───────────┬───────────┘      └───────────────────┬───────────────────┘
//!             └──────────────┬───────────────────────┘
//!                            ▼
//!                    trait TokenStore
//!                load / save / clear
//! ```
//!
//! Platform paths for the file store:
//! - **macOS**: `~/Library/Application Support/vn.teahouse.pos/session.json`
//! - **Windows**: `%APPDATA%\teahouse\pos\data\session.json`
//! - **Linux**: `~/.local/share/pos/session.json`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use directories::ProjectDirs;
use serde_json::{Map, Value};

/// Key the bearer token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "token";

const TOKEN_FILE_NAME: &str = "session.json";

/// Token persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Token file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Token file is corrupt: {0}")]
    Corrupt(String),

    #[error("Could not determine app data directory")]
    NoDataDir,
}

/// Where the bearer token lives between app runs.
pub trait TokenStore: Send + Sync {
    /// Reads the stored token, if any.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> Result<(), StoreError>;

    /// Deletes the stored token. Succeeds if nothing was stored.
    fn clear(&self) -> Result<(), StoreError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Token store that forgets everything on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token, as if left by a previous run.
    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryTokenStore {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// Token store backed by a small JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    /// Store in the platform app data directory, or at `override_path`.
    pub fn open(override_path: Option<&Path>) -> Result<Self, StoreError> {
        match override_path {
            Some(path) => Ok(FileTokenStore::new(path)),
            None => Ok(FileTokenStore::new(default_token_path()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entries: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        match entries.get(TOKEN_STORAGE_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(token)) => Ok(Some(token.clone())),
            Some(other) => Err(StoreError::Corrupt(format!(
                "expected a string under \"{}\", found {}",
                TOKEN_STORAGE_KEY, other
            ))),
        }
    }

    fn save(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut entries = Map::new();
        entries.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        let body = serde_json::to_string(&entries).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        fs::write(&self.path, body)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn default_token_path() -> Result<PathBuf, StoreError> {
    let proj_dirs = ProjectDirs::from("vn", "teahouse", "pos").ok_or(StoreError::NoDataDir)?;
    Ok(proj_dirs.data_dir().join(TOKEN_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileTokenStore {
        let dir = std::env::temp_dir().join(format!("teahouse-pos-{}", uuid::Uuid::new_v4()));
        FileTokenStore::new(dir.join(TOKEN_FILE_NAME))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save("abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = temp_store();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let store = temp_store();

        store.save("eyJ.payload.sig").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("eyJ.payload.sig"));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"token":"eyJ.payload.sig"}"#);

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file() {
        let store = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));

        fs::write(store.path(), r#"{"token": 42}"#).unwrap();
        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));

        store.clear().unwrap();
    }
}

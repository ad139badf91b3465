//! Key-value blob storage used to persist the filesystem, history and
//! settings between sessions.
//!
//! Loads never fail: a missing or unreadable blob is reported as `None` and
//! treated by callers as "no saved state".

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{PshError, Result};

/// Blob key for the filesystem snapshot.
pub const VFS_KEY: &str = "psh.vfs";
/// Blob key for the command history.
pub const HISTORY_KEY: &str = "psh.history";
/// Blob key for UI settings.
pub const SETTINGS_KEY: &str = "psh.settings";

/// A string-valued key-value store.
pub trait BlobStore {
    /// Fetch the blob stored under `key`, if any.
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous blob.
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store that lives as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, key: &str) -> Option<String> {
        self.blobs.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that keeps one `<key>.json` file per blob inside a directory.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    dir: PathBuf,
}

impl DirBlobStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn file_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
        if !valid || key.starts_with('.') {
            return Err(PshError::Storage(format!("invalid blob key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for DirBlobStore {
    fn load(&self, key: &str) -> Option<String> {
        let path = self.file_for(key).ok()?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Failed to read {}: {e}", path.display());
                None
            },
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.file_for(key)?;
        // Write to a sibling file first so a crash never leaves half a blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

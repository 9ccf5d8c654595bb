//! Filesystem-backed store
//!
//! ## Layout
//!
//! ```text
//! <data_dir>/
//! ├── blotters.json
//! ├── documents.json
//! └── barangaySettings.json
//! ```
//!
//! Writes go to `<key>.json.tmp` and are renamed over the target, so a crash
//! mid-write leaves the previous value intact.

use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::{RecordsError, RecordsResult};

/// One JSON file per key under a data directory
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Open a store, creating the directory if needed
    pub fn open(base: impl Into<PathBuf>) -> RecordsResult<Self> {
        let base = base.into();
        std::fs::create_dir_all(&base)?;
        tracing::debug!(path = %base.display(), "Opened local store");
        Ok(Self { base })
    }

    pub fn path(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> RecordsResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(RecordsError::Storage(format!("invalid key: {:?}", key)));
        }
        Ok(self.base.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> RecordsResult<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> RecordsResult<()> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> RecordsResult<()> {
        match std::fs::remove_file(self.key_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_on_disk() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("records")).unwrap();

        assert_eq!(store.get("documents").unwrap(), None);
        store.set("documents", "[]").unwrap();
        assert_eq!(store.get("documents").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("records/documents.json").exists());
        assert!(!dir.path().join("records/documents.json.tmp").exists());

        store.remove("documents").unwrap();
        store.remove("documents").unwrap();
        assert_eq!(store.get("documents").unwrap(), None);
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let dir = tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("barangaySettings", "{}")
            .unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("barangaySettings").unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Directory-backed key-value store, one file per key

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::KeyValueStore;
use crate::error::{Error, Result};

/// Stores each record as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::invalid_argument(format!(
                "storage key '{}' is not a valid file name",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(key, e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::storage(key, e))?;

        // Write to a sibling file first so readers never see a partial record
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| Error::storage(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::storage(key, e))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cookies"));

        assert_eq!(store.get("cookies-abc").await.unwrap(), None);

        store.set("cookies-abc", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("cookies-abc").await.unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("cookies/cookies-abc.json").exists());

        store.remove("cookies-abc").await.unwrap();
        store.remove("cookies-abc").await.unwrap();
        assert_eq!(store.get("cookies-abc").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get("../escape").await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_record_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the record file should be cannot be read as text
        std::fs::create_dir_all(dir.path().join("cookies-dir.json")).unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get("cookies-dir").await.unwrap_err().is_storage());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Durable cookie storage
//!
//! Cookies live in an arbitrary key-value backend ([`KeyValueStore`]). The
//! [`CookieStore`] maps a hostname to its jar under a hashed key so that raw
//! hostnames never appear as storage keys.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::http::CookieJar;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Prefix of every cookie record key
pub const KEY_PREFIX: &str = "cookies-";

/// Key-value persistence backend
///
/// `get` of an absent key is `Ok(None)`; `Err` is reserved for a backend that
/// could not be read or written. `remove` of an absent key succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a record
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Create or overwrite a record
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete a record
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Storage key for a hostname: `cookies-` + hex sha256
pub fn storage_key(hostname: &str) -> String {
    format!("{}{:x}", KEY_PREFIX, Sha256::digest(hostname.as_bytes()))
}

/// Hostname to cookie jar mapping over a [`KeyValueStore`]
///
/// No lock spans a read-merge-write cycle: two concurrent requests to the same
/// host may both read the old jar and the last write wins.
#[derive(Clone)]
pub struct CookieStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CookieStore {
    /// Create a cookie store over a backend
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Cookie store backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Get the backend
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Load the jar for a hostname
    ///
    /// An absent or unreadable record is an empty jar; only backend failures
    /// are errors.
    pub async fn get(&self, hostname: &str) -> Result<CookieJar> {
        let key = storage_key(hostname);
        let Some(record) = self.backend.get(&key).await? else {
            return Ok(CookieJar::new());
        };

        match CookieJar::from_json(&record) {
            Ok(jar) => Ok(jar),
            Err(e) => {
                tracing::warn!(hostname = %hostname, key = %key, error = %e, "Discarding corrupt cookie record");
                Ok(CookieJar::new())
            }
        }
    }

    /// Overwrite the jar for a hostname
    pub async fn set(&self, hostname: &str, jar: &CookieJar) -> Result<()> {
        let key = storage_key(hostname);
        let record = jar.to_json()?;
        tracing::debug!(hostname = %hostname, cookies = jar.len(), "Storing cookies");
        self.backend.set(&key, record).await
    }

    /// Remove the jar for a hostname
    pub async fn clear(&self, hostname: &str) -> Result<()> {
        let key = storage_key(hostname);
        tracing::debug!(hostname = %hostname, "Clearing cookies");
        self.backend.remove(&key).await
    }
}

impl Default for CookieStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for CookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Err(Error::storage(key, "backend offline"))
        }

        async fn set(&self, key: &str, _value: String) -> Result<()> {
            Err(Error::storage(key, "backend offline"))
        }

        async fn remove(&self, key: &str) -> Result<()> {
            Err(Error::storage(key, "backend offline"))
        }
    }

    #[test]
    fn test_storage_key_shape() {
        let key = storage_key("example.com");
        assert!(key.starts_with("cookies-"));
        assert_eq!(key.len(), KEY_PREFIX.len() + 64);
        assert_eq!(key, storage_key("example.com"));
        assert_ne!(key, storage_key("example.org"));
        assert!(!key.contains("example"));
    }

    #[tokio::test]
    async fn test_unknown_host_is_empty() {
        let store = CookieStore::in_memory();
        assert!(store.get("never.seen").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = CookieStore::in_memory();
        let jar = CookieJar::parse_cookies_string("sid=abc123, theme=dark");

        store.set("example.com", &jar).await.unwrap();
        let loaded = store.get("example.com").await.unwrap();

        assert_eq!(loaded.serialize(), jar.serialize());
        assert!(store.get("other.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let store = CookieStore::in_memory();
        store
            .set("example.com", &CookieJar::parse_cookies_string("a=1"))
            .await
            .unwrap();

        store.clear("example.com").await.unwrap();
        assert!(store.get("example.com").await.unwrap().is_empty());

        // clearing again is fine
        store.clear("example.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_record_is_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .set(&storage_key("example.com"), "{not json".to_string())
            .await
            .unwrap();

        let store = CookieStore::new(backend);
        assert!(store.get("example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_storage_error() {
        let store = CookieStore::new(Arc::new(BrokenStore));

        assert!(store.get("example.com").await.unwrap_err().is_storage());
        assert!(store
            .set("example.com", &CookieJar::new())
            .await
            .unwrap_err()
            .is_storage());
    }
}

//! Durable session storage
//!
//! The API client persists its session (token pair plus a cached user
//! snapshot) through the [`SessionStore`] trait, so hosts decide what
//! durability looks like: a JSON file for the CLI, an in-memory map for
//! tests or throwaway sessions.

use crate::CoreResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Well-known keys written by the session layer
pub mod keys {
    /// Bearer token attached to authenticated requests
    pub const ACCESS_TOKEN: &str = "accessToken";
    /// Token exchanged for a fresh pair when the access token expires
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// JSON-encoded snapshot of the signed-in user
    pub const CURRENT_USER: &str = "currentUser";
}

/// String key-value store the session layer persists through
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;
    async fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-memory store, the default when no durability is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// File-backed store holding a single JSON object
///
/// The document is read once at open; every mutation rewrites it under an
/// internal lock. Missing files read as empty, and the parent directory is
/// created on first write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`, loading any existing document
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        let mut entries = self.entries.write().await;
        if entries.remove(key).is_some() {
            self.flush(&entries).await?;
        }
        Ok(())
    }
}

// Mock implementation for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub SessionStore {}

        #[async_trait]
        impl SessionStore for SessionStore {
            async fn get(&self, key: &str) -> CoreResult<Option<String>>;
            async fn set(&self, key: &str, value: &str) -> CoreResult<()>;
            async fn remove(&self, key: &str) -> CoreResult<()>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get(keys::ACCESS_TOKEN).await.unwrap(), None);

        store.set(keys::ACCESS_TOKEN, "t1").await.unwrap();
        assert_eq!(
            store.get(keys::ACCESS_TOKEN).await.unwrap().as_deref(),
            Some("t1")
        );

        store.remove(keys::ACCESS_TOKEN).await.unwrap();
        assert_eq!(store.get(keys::ACCESS_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_opens_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("session.json"))
            .await
            .unwrap();
        assert_eq!(store.get(keys::REFRESH_TOKEN).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let store = FileStore::open(&path).await.unwrap();
        store.set(keys::ACCESS_TOKEN, "t1").await.unwrap();
        store.set(keys::REFRESH_TOKEN, "r1").await.unwrap();
        store.remove(keys::ACCESS_TOKEN).await.unwrap();
        drop(store);

        let reopened = FileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).await.unwrap(), None);
        assert_eq!(
            reopened.get(keys::REFRESH_TOKEN).await.unwrap().as_deref(),
            Some("r1")
        );
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = FileStore::open(&path).await;
        assert!(matches!(
            result,
            Err(crate::CoreError::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn removing_absent_key_skips_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path).await.unwrap();
        store.remove(keys::CURRENT_USER).await.unwrap();
        // No write happened, so the file still does not exist.
        assert!(!path.exists());
    }
}

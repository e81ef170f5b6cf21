//! Durable token persistence.
//!
//! The token is the only state that outlives the process. It's written on
//! login, read on `initialize()`, and cleared on logout or expiry — always
//! by the session store, never by anyone else.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stockline_protocol::{Codec, JsonCodec};
use tokio::sync::Mutex;

use crate::StorageError;

/// A key/value home for the session token.
pub trait TokenStore: Send + Sync + 'static {
    /// Reads the token under `key`. `Ok(None)` means nothing is stored.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Stores `token` under `key`, replacing whatever was there.
    fn save(&self, key: &str, token: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes `key`. Clearing a missing key is not an error.
    fn clear(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryTokenStore
// ---------------------------------------------------------------------------

/// Process-local storage. Clones share the same entries, so a test can
/// keep one clone and inspect what the store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `token` already stored under `key`, as if a previous
    /// run had signed in.
    pub fn with_token(key: &str, token: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_string(), token.to_string());
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save(&self, key: &str, token: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), token.to_string());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileTokenStore
// ---------------------------------------------------------------------------

/// Keeps tokens in a small JSON object on disk: `{"<key>": "<token>"}`.
///
/// Writes go to a sibling temp file and are renamed into place, so a crash
/// mid-write leaves either the old file or the new one, never half of each.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    codec: JsonCodec,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            codec: JsonCodec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => self.codec.decode(&bytes).map_err(StorageError::Corrupt),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if entries.is_empty() {
            return self.remove_file().await;
        }

        let bytes = self.codec.encode(entries).map_err(StorageError::Corrupt)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let suffix: u64 = rand::random();
        let tmp = self.path.with_extension(format!("tmp-{suffix:016x}"));
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove_file(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TokenStore for FileTokenStore {
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries().await?.remove(key))
    }

    async fn save(&self, key: &str, token: &str) -> Result<(), StorageError> {
        // A corrupt file holds nothing worth keeping; start over.
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing corrupt token file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.to_string(), token.to_string());
        self.write_entries(&entries).await
    }

    async fn clear(&self, key: &str) -> Result<(), StorageError> {
        match self.read_entries().await {
            Ok(mut entries) => {
                if entries.remove(key).is_none() {
                    return Ok(());
                }
                self.write_entries(&entries).await
            }
            Err(StorageError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "removing corrupt token file");
                self.remove_file().await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let suffix: u64 = rand::random();
        std::env::temp_dir()
            .join(format!("stockline-storage-{suffix:016x}"))
            .join(name)
    }

    // =====================================================================
    // MemoryTokenStore
    // =====================================================================

    #[tokio::test]
    async fn test_memory_store_save_then_load() {
        let store = MemoryTokenStore::new();
        store.save("k", "t1").await.unwrap();

        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("t1"));
        assert_eq!(store.load("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryTokenStore::new();
        let observer = store.clone();

        store.save("k", "t1").await.unwrap();
        assert_eq!(observer.load("k").await.unwrap().as_deref(), Some("t1"));

        store.clear("k").await.unwrap();
        assert_eq!(observer.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_clear_missing_key_is_ok() {
        let store = MemoryTokenStore::new();
        assert!(store.clear("nothing").await.is_ok());
    }

    // =====================================================================
    // FileTokenStore
    // =====================================================================

    #[tokio::test]
    async fn test_file_store_missing_file_loads_none() {
        let store = FileTokenStore::new(scratch_path("token.json"));
        assert_eq!(store.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_save_creates_parent_and_persists() {
        let path = scratch_path("nested/token.json");
        let store = FileTokenStore::new(&path);

        store.save("k", "abc").await.unwrap();

        // A fresh instance reads what the first one wrote.
        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.load("k").await.unwrap().as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_file_store_keeps_other_keys() {
        let store = FileTokenStore::new(scratch_path("token.json"));
        store.save("a", "1").await.unwrap();
        store.save("b", "2").await.unwrap();

        store.clear("a").await.unwrap();

        assert_eq!(store.load("a").await.unwrap(), None);
        assert_eq!(store.load("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_file_store_clearing_last_key_removes_file() {
        let path = scratch_path("token.json");
        let store = FileTokenStore::new(&path);
        store.save("k", "abc").await.unwrap();

        store.clear("k").await.unwrap();

        assert!(!path.exists(), "empty token file should be removed");
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_load_errors_and_clear_recovers() {
        let path = scratch_path("token.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"not json").await.unwrap();
        let store = FileTokenStore::new(&path);

        let loaded = store.load("k").await;
        assert!(matches!(loaded, Err(StorageError::Corrupt(_))));

        store.clear("k").await.unwrap();
        assert!(!path.exists());
        assert_eq!(store.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_save_over_corrupt_file() {
        let path = scratch_path("token.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{{{").await.unwrap();
        let store = FileTokenStore::new(&path);

        store.save("k", "fresh").await.unwrap();

        assert_eq!(store.load("k").await.unwrap().as_deref(), Some("fresh"));
    }
}

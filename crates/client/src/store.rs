//! Durable storage for the bearer token.
//!
//! Stores are small string key-value maps. The bearer token lives under
//! [`TOKEN_KEY`]; the identity provider keeps its own session under a
//! separate key in the same store.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::Mutex;

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "userToken";

/// Errors that can occur when reading or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store file {path} is not a JSON object of strings: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Persistent string key-value store holding the session token.
#[async_trait]
pub trait TokenStore: Send + Sync + Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Stored bearer token, if any. An empty value counts as absent.
    async fn load(&self) -> Result<Option<SecretString>, StoreError> {
        Ok(self
            .get(TOKEN_KEY)
            .await?
            .filter(|token| !token.is_empty())
            .map(SecretString::from))
    }

    async fn save(&self, token: &SecretString) -> Result<(), StoreError> {
        self.set(TOKEN_KEY, token.expose_secret()).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.remove(TOKEN_KEY).await
    }
}

/// JSON file store that survives process restarts.
///
/// The file holds a flat object such as `{"userToken": "..."}`. Writes go
/// through a temporary file and a rename so a crash never leaves a torn file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let bytes = serde_json::to_vec_pretty(map).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map).await
    }
}

/// In-process store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a bearer token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ajaxtreon-store-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_file_store_round_trip_survives_new_instance() {
        let path = temp_path("session.json");
        let store = FileTokenStore::new(&path);
        assert!(store.load().await.unwrap().is_none());

        store.save(&SecretString::from("jwt-abc")).await.unwrap();

        let reopened = FileTokenStore::new(&path);
        let token = reopened.load().await.unwrap().unwrap();
        assert_eq!(token.expose_secret(), "jwt-abc");

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["userToken"], "jwt-abc");
    }

    #[tokio::test]
    async fn test_clear_keeps_other_keys() {
        let path = temp_path("session.json");
        let store = FileTokenStore::new(&path);
        store.set("identitySession", "{}").await.unwrap();
        store.save(&SecretString::from("jwt")).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
        assert_eq!(
            store.get("identitySession").await.unwrap().as_deref(),
            Some("{}")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let path = temp_path("session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(StoreError::Format { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_token_counts_as_absent() {
        let store = MemoryTokenStore::with_token("");
        assert!(store.load().await.unwrap().is_none());
    }
}

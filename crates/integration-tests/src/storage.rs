//! Guest storage that can be told to refuse writes to chosen keys.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use fashion_store_client::storage::StorageError;
use fashion_store_client::{KeyValueStore, MemoryStore};
use tokio::sync::Mutex;

/// A [`MemoryStore`] whose writes to refused keys fail with an I/O error,
/// as a full disk would.
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    refused: Mutex<HashSet<String>>,
}

impl FlakyStore {
    #[must_use]
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            refused: Mutex::new(HashSet::new()),
        }
    }

    pub async fn refuse_writes_to(&self, key: &str) {
        self.refused.lock().await.insert(key.to_owned());
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.refused.lock().await.contains(key) {
            return Err(StorageError::Io(io::Error::other(format!("no space left writing {key}"))));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

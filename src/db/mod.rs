pub mod repository;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;

pub use repository::{AgendaPersistence, JsonAgendaPersistence};
pub use sqlite::SqliteKeyValueStore;

/// Asynchronous string key-value storage, the device-level persistence the
/// agenda is written into.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_get_and_set() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get_item("k").await.expect("get failed"), None);

        store.set_item("k", "v1").await.expect("set failed");
        store.set_item("k", "v2").await.expect("set failed");
        assert_eq!(store.get_item("k").await.expect("get failed").as_deref(), Some("v2"));
    }
}

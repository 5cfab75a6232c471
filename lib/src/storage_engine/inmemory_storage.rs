// lib/src/storage_engine/inmemory_storage.rs
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::{Result, StorageError};
use crate::storage_engine::storage_engine::DocumentStore;
use crate::util::check_unique;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Volatile engine for tests and throwaway deployments.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    collections: RwLock<Collections>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStorage {
    async fn insert(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(StorageError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check_unique(collection, id, &document, unique, docs.values())?;
        docs.insert(id.to_string(), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<bool> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        if !docs.contains_key(id) {
            return Ok(false);
        }
        check_unique(collection, id, &document, unique, docs.values())?;
        docs.insert(id.to_string(), document);
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let mut collections = self.collections.write().await;
        Ok(collections.get_mut(collection).and_then(|docs| docs.remove(id)))
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn get_type(&self) -> &'static str {
        "memory"
    }
}

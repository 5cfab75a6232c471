// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::util::field;

/// A schemaless document store: named collections of JSON objects keyed by id.
///
/// Engines must make the uniqueness check in `insert`/`replace` atomic with
/// the write it guards. Nothing else is transactional.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Stores a new document. Fails with `AlreadyExists` if `id` is taken and
    /// with `Duplicate` if any field in `unique` collides with another document.
    async fn insert(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<()>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Every document in the collection, in engine order.
    async fn scan(&self, collection: &str) -> Result<Vec<Value>>;

    /// Overwrites an existing document. Returns `false` when `id` is absent.
    async fn replace(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<bool>;

    /// Removes a document, returning it if it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Documents whose top-level `field_name` equals `value`.
    async fn find(&self, collection: &str, field_name: &str, value: &Value) -> Result<Vec<Value>> {
        Ok(self
            .scan(collection)
            .await?
            .into_iter()
            .filter(|doc| field(doc, field_name) == Some(value))
            .collect())
    }

    async fn flush(&self) -> Result<()>;

    fn get_type(&self) -> &'static str;
}

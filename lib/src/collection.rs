// lib/src/collection.rs
// Typed view over one collection of a `DocumentStore`.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use models::{Document, ValidationError};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{Result, StorageError};
use crate::storage_engine::DocumentStore;
use crate::util::{merge_patch, sanitize_patch};

pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

fn decode<T: Document>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Collection {
            store,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    /// Normalizes, validates and stores a new document.
    pub async fn insert(&self, mut document: T) -> Result<T> {
        document.normalize();
        document.validate()?;
        let value = serde_json::to_value(&document)?;
        self.store
            .insert(T::COLLECTION, document.id(), value, T::UNIQUE_FIELDS)
            .await?;
        Ok(document)
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>> {
        self.store.get(T::COLLECTION, id).await?.map(decode).transpose()
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.store.get(T::COLLECTION, id).await?.is_some())
    }

    pub async fn all(&self) -> Result<Vec<T>> {
        self.store
            .scan(T::COLLECTION)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Documents whose serialized `field` equals `value`.
    pub async fn find_by<V: Serialize>(&self, field: &str, value: V) -> Result<Vec<T>> {
        let value = serde_json::to_value(value)?;
        self.store
            .find(T::COLLECTION, field, &value)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }

    pub async fn find_one_by<V: Serialize>(&self, field: &str, value: V) -> Result<Option<T>> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }

    /// Overwrites a stored document. Returns `None` when it no longer exists.
    pub async fn replace(&self, mut document: T) -> Result<Option<T>> {
        document.normalize();
        document.validate()?;
        document.touch(Utc::now());
        let value = serde_json::to_value(&document)?;
        let replaced = self
            .store
            .replace(T::COLLECTION, document.id(), value, T::UNIQUE_FIELDS)
            .await?;
        Ok(replaced.then_some(document))
    }

    /// Applies a JSON merge patch. `id` and `createdAt` in the patch are
    /// ignored; the merged document must still decode as `T` and validate.
    pub async fn update(&self, id: &str, patch: Value) -> Result<Option<T>> {
        let patch = sanitize_patch(patch)?;
        let Some(mut current) = self.store.get(T::COLLECTION, id).await? else {
            return Ok(None);
        };
        merge_patch(&mut current, &patch);
        let document: T = serde_json::from_value(current)
            .map_err(|e| StorageError::Validation(ValidationError::Malformed(e.to_string())))?;
        self.replace(document).await
    }

    pub async fn remove(&self, id: &str) -> Result<Option<T>> {
        self.store.delete(T::COLLECTION, id).await?.map(decode).transpose()
    }

    /// Removes every document whose `field` equals `value`; returns the count.
    pub async fn remove_by<V: Serialize>(&self, field: &str, value: V) -> Result<usize> {
        let matches = self.find_by(field, value).await?;
        let mut removed = 0;
        for document in matches {
            if self.store.delete(T::COLLECTION, document.id()).await?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

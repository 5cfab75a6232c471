// lib/src/storage_engine/sled_storage.rs
// One sled tree per collection, documents stored as JSON bytes under their id.

use std::path::Path;

use async_trait::async_trait;
use log::{debug, info};
use serde_json::Value;
use sled::{Db, Tree};
use tokio::sync::Mutex;

use crate::errors::{Result, StorageError};
use crate::storage_engine::storage_engine::DocumentStore;
use crate::util::check_unique;

/// Opens (creating if needed) a sled database at `path`.
pub fn open_sled_db(path: &Path) -> Result<Db> {
    if !path.exists() {
        info!("Creating database directory at {:?}", path);
        std::fs::create_dir_all(path)
            .map_err(|e| StorageError::Config(format!("Failed to create database directory at {:?}: {}", path, e)))?;
    } else if !path.is_dir() {
        return Err(StorageError::Config(format!("Path {:?} is not a directory", path)));
    }
    let db = sled::Config::new().path(path).open()?;
    info!("Opened sled database at {:?}", path);
    Ok(db)
}

pub struct SledStorage {
    db: Db,
    // Serializes writers so a uniqueness scan and its insert cannot interleave.
    write_lock: Mutex<()>,
}

impl SledStorage {
    pub fn new(db: Db) -> Self {
        SledStorage {
            db,
            write_lock: Mutex::new(()),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        open_sled_db(path).map(SledStorage::new)
    }

    fn tree(&self, collection: &str) -> Result<Tree> {
        Ok(self.db.open_tree(collection)?)
    }
}

fn read_all(tree: &Tree) -> Result<Vec<Value>> {
    tree.iter()
        .values()
        .map(|item| -> Result<Value> {
            let bytes = item?;
            Ok(serde_json::from_slice(&bytes)?)
        })
        .collect()
}

#[async_trait]
impl DocumentStore for SledStorage {
    async fn insert(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(collection)?;
        if tree.contains_key(id.as_bytes())? {
            return Err(StorageError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        if !unique.is_empty() {
            let existing = read_all(&tree)?;
            check_unique(collection, id, &document, unique, &existing)?;
        }
        tree.insert(id.as_bytes(), serde_json::to_vec(&document)?)?;
        debug!("Inserted {}/{}", collection, id);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let tree = self.tree(collection)?;
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>> {
        read_all(&self.tree(collection)?)
    }

    async fn replace(&self, collection: &str, id: &str, document: Value, unique: &[&str]) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(collection)?;
        if !tree.contains_key(id.as_bytes())? {
            return Ok(false);
        }
        if !unique.is_empty() {
            let existing = read_all(&tree)?;
            check_unique(collection, id, &document, unique, &existing)?;
        }
        tree.insert(id.as_bytes(), serde_json::to_vec(&document)?)?;
        debug!("Replaced {}/{}", collection, id);
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let _guard = self.write_lock.lock().await;
        let tree = self.tree(collection)?;
        match tree.remove(id.as_bytes())? {
            Some(bytes) => {
                debug!("Deleted {}/{}", collection, id);
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => Ok(None),
        }
    }

    async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn get_type(&self) -> &'static str {
        "sled"
    }
}

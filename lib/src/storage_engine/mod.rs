// lib/src/storage_engine/mod.rs

pub mod config;
pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;

pub use config::{StorageConfig, StorageEngineType};
pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{open_sled_db, SledStorage};
pub use storage_engine::DocumentStore;

use log::info;
use std::sync::Arc;

use crate::errors::Result;

/// Creates the document store described by `config`.
pub fn create_storage(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    info!("Opening {} document store", config.engine_type);
    match config.engine_type {
        StorageEngineType::Sled => Ok(Arc::new(SledStorage::open(&config.data_path)?)),
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new())),
    }
}

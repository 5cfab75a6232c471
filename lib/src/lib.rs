// lib/src/lib.rs
//! Storage layer: document store engines and typed collections.

pub mod collection;
pub mod errors;
pub mod storage_engine;
pub mod util;

pub use collection::Collection;
pub use errors::{Result, StorageError};
pub use storage_engine::{create_storage, DocumentStore, InMemoryStorage, SledStorage, StorageConfig, StorageEngineType};

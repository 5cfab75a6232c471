// lib/src/storage_engine/config.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::StorageError;

pub const DEFAULT_DATA_DIRECTORY: &str = "./data/hospital";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    Sled,
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageEngineType::Sled),
            "memory" | "inmemory" => Ok(StorageEngineType::InMemory),
            _ => Err(StorageError::Config(format!("Unknown storage engine type: {}", s))),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Sled => write!(f, "sled"),
            StorageEngineType::InMemory => write!(f, "memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub engine_type: StorageEngineType,
    pub data_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            engine_type: StorageEngineType::Sled,
            data_path: PathBuf::from(DEFAULT_DATA_DIRECTORY),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        StorageConfig {
            engine_type: StorageEngineType::InMemory,
            data_path: PathBuf::new(),
        }
    }

    /// Parses a connection string: `memory://`, `sled://<path>`, or a bare
    /// filesystem path (sled).
    pub fn from_url(url: &str) -> Result<Self, StorageError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(StorageConfig::default());
        }
        match url.split_once("://") {
            Some((scheme, rest)) => {
                let engine_type: StorageEngineType = scheme.parse()?;
                let data_path = match engine_type {
                    StorageEngineType::InMemory => PathBuf::new(),
                    StorageEngineType::Sled if rest.is_empty() => PathBuf::from(DEFAULT_DATA_DIRECTORY),
                    StorageEngineType::Sled => PathBuf::from(rest),
                };
                Ok(StorageConfig { engine_type, data_path })
            }
            None => Ok(StorageConfig {
                engine_type: StorageEngineType::Sled,
                data_path: PathBuf::from(url),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_connection_strings() {
        assert_eq!(StorageConfig::from_url("memory://").unwrap(), StorageConfig::in_memory());
        let sled = StorageConfig::from_url("sled:///var/lib/hospital").unwrap();
        assert_eq!(sled.engine_type, StorageEngineType::Sled);
        assert_eq!(sled.data_path, PathBuf::from("/var/lib/hospital"));
        assert_eq!(StorageConfig::from_url("./db").unwrap().data_path, PathBuf::from("./db"));
        assert_eq!(StorageConfig::from_url("").unwrap(), StorageConfig::default());
    }

    #[test]
    fn rejects_unknown_scheme() {
        assert!(matches!(StorageConfig::from_url("mongodb://localhost"), Err(StorageError::Config(_))));
    }
}

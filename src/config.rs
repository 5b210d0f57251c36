use crate::persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceError};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = "./workout-data";
const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected file, sqlite or memory)")]
    UnknownBackend(String),
    #[error("invalid http address '{value}': {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("backend '{0}' is not compiled into this build")]
    BackendUnavailable(&'static str),
    #[error(transparent)]
    Store(#[from] PersistenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
    pub http_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    pub fn from_env_with<F>(mut get: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let data_dir = get("WORKOUT_TRACKER_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let backend = match get("WORKOUT_TRACKER_BACKEND") {
            Some(value) => StorageBackend::parse(&value)?,
            None => StorageBackend::File,
        };
        let addr = get("WORKOUT_TRACKER_HTTP_ADDR").unwrap_or_else(|| DEFAULT_HTTP_ADDR.into());
        let http_addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr.clone(),
                source,
            })?;
        Ok(Self {
            data_dir,
            backend,
            http_addr,
        })
    }

    /// Build the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, ConfigError> {
        match self.backend {
            StorageBackend::File => Ok(Arc::new(FileStore::new(&self.data_dir)?)),
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => {
                std::fs::create_dir_all(&self.data_dir).map_err(PersistenceError::from)?;
                let store = crate::persistence::sqlite::SqliteStore::new(
                    self.data_dir.join("workouts.sqlite3"),
                )?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "sqlite"))]
            StorageBackend::Sqlite => Err(ConfigError::BackendUnavailable("sqlite")),
        }
    }
}

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Error as SerdeJsonError;
use std::collections::HashMap;
use std::io;
use thiserror::Error;

/// Key under which the workout collection is stored.
pub const WORKOUTS_KEY: &str = "savedWorkouts";
/// Key under which the date → workouts mapping is stored.
pub const SCHEDULE_KEY: &str = "workoutSchedule";
pub const PROFILE_KEY: &str = "userProfile";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// A flat byte-oriented namespace keyed by logical store name.
///
/// `save` replaces the whole value under `key`; implementations must never let
/// a concurrent `load` observe a partially written value. `load` returns
/// `Ok(None)` for a key that has never been written.
pub trait KeyValueStore: Send + Sync {
    fn save(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()>;
    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>>;
    fn remove(&self, key: &str) -> PersistenceResult<()>;
}

/// Process-local store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()> {
        self.entries.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

pub(crate) fn encode_json<T: Serialize + ?Sized>(value: &T) -> PersistenceResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerdeJsonError> {
    serde_json::from_slice(bytes)
}

/// Reject keys that could escape a storage directory or collide after escaping.
pub(crate) fn validate_key(key: &str) -> PersistenceResult<()> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(PersistenceError::InvalidData(format!(
            "invalid store key '{key}'"
        )));
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    FileStore, PlannerSnapshot, load_snapshot_from_json, save_schedule_to_csv,
    save_snapshot_to_json,
};

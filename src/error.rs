use crate::persistence::PersistenceError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("{context}: index {index} is out of range (len {len})")]
    OutOfRange {
        context: String,
        index: usize,
        len: usize,
    },
    #[error("unknown workout {0}")]
    UnknownWorkout(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// A recovered load failure: the affected collection fell back to empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadNotice {
    pub key: String,
    pub message: String,
}

impl LoadNotice {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not read '{}': {}", self.key, self.message)
    }
}

use crate::exercise::Exercise;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// A named, ordered list of exercises. Immutable once created; equality follows `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    pub fn new(name: impl Into<String>, exercises: Vec<Exercise>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            exercises,
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        exercises: Vec<Exercise>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            exercises,
        }
    }

    pub fn exercise_ids(&self) -> Vec<&str> {
        self.exercises.iter().map(|e| e.id.as_str()).collect()
    }
}

impl PartialEq for Workout {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Workout {}

impl Hash for Workout {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutValidationError {
    message: String,
}

impl WorkoutValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkoutValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WorkoutValidationError {}

pub fn validate_workout(workout: &Workout) -> Result<(), WorkoutValidationError> {
    if workout.id.trim().is_empty() {
        return Err(WorkoutValidationError::new(format!(
            "workout '{}' has an empty id",
            workout.name
        )));
    }
    if workout.name.trim().is_empty() {
        return Err(WorkoutValidationError::new(format!(
            "workout {} has an empty name",
            workout.id
        )));
    }
    Ok(())
}

pub fn validate_workouts(workouts: &[Workout]) -> Result<(), WorkoutValidationError> {
    let mut seen_ids = HashSet::with_capacity(workouts.len());
    for workout in workouts {
        validate_workout(workout)?;
        if !seen_ids.insert(workout.id.as_str()) {
            return Err(WorkoutValidationError::new(format!(
                "duplicate workout id {}",
                workout.id
            )));
        }
    }
    Ok(())
}

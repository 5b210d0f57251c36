use super::{KeyValueStore, PersistenceError, PersistenceResult, validate_key};
use crate::schedule::Schedule;
use crate::workout::{Workout, validate_workouts};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores each key as `<root>/<key>.json`.
///
/// Writes land in a temporary file inside `root` and are renamed over the
/// target, so a reader sees either the previous value or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> PersistenceResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PersistenceResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn save(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|err| err.error)?;
        debug!(key, path = %path.display(), len = bytes.len(), "wrote store file");
        Ok(())
    }

    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Full backup of the planner: every workout plus the schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerSnapshot {
    pub workouts: Vec<Workout>,
    #[serde(default)]
    pub schedule: Schedule,
}

impl PlannerSnapshot {
    fn validate(&self) -> PersistenceResult<()> {
        validate_workouts(&self.workouts)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))
    }
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &PlannerSnapshot,
    path: P,
) -> PersistenceResult<()> {
    snapshot.validate()?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, snapshot)?;
    Ok(())
}

pub fn load_snapshot_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<PlannerSnapshot> {
    let file = File::open(path)?;
    let snapshot: PlannerSnapshot = serde_json::from_reader(file)?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[derive(Debug, Serialize, Deserialize)]
struct AssignmentCsvRecord {
    date: String,
    position: usize,
    workout_id: String,
    workout_name: String,
    exercise_count: usize,
    exercise_ids: String,
}

impl AssignmentCsvRecord {
    fn new(date: String, position: usize, workout: &Workout) -> Self {
        Self {
            date,
            position,
            workout_id: workout.id.clone(),
            workout_name: workout.name.clone(),
            exercise_count: workout.exercises.len(),
            exercise_ids: workout.exercise_ids().join(";"),
        }
    }
}

/// One row per assignment, dates ascending, positions in list order.
pub fn save_schedule_to_csv<P: AsRef<Path>>(schedule: &Schedule, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (date, workouts) in schedule {
        for (position, workout) in workouts.iter().enumerate() {
            writer.serialize(AssignmentCsvRecord::new(date.to_string(), position, workout))?;
        }
    }
    writer.flush()?;
    Ok(())
}

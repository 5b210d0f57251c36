use crate::error::{LoadNotice, PlannerError, PlannerResult};
use crate::exercise::Exercise;
use crate::persistence::{KeyValueStore, WORKOUTS_KEY, decode_json, encode_json};
use crate::schedule::ScheduleSync;
use crate::workout::{Workout, validate_workouts};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum RepositoryState {
    Unloaded,
    Loaded(Vec<Workout>),
}

/// Owns the canonical workout collection.
///
/// The collection is read from the store on first use and every mutation
/// rewrites the whole collection under [`WORKOUTS_KEY`].
pub struct WorkoutRepository<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    state: RepositoryState,
    notices: Vec<LoadNotice>,
    degraded: bool,
}

impl<S: KeyValueStore + ?Sized> WorkoutRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: RepositoryState::Unloaded,
            notices: Vec::new(),
            degraded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, RepositoryState::Loaded(_))
    }

    /// Drop the in-memory collection; the next call reads the store again.
    pub fn reload(&mut self) {
        self.state = RepositoryState::Unloaded;
        self.degraded = false;
    }

    /// True while the collection in memory stands in for stored data that
    /// could not be read. Cleared by the next successful write.
    pub fn is_degraded(&mut self) -> bool {
        self.loaded();
        self.degraded
    }

    pub fn list(&mut self) -> &[Workout] {
        self.loaded()
    }

    pub fn len(&mut self) -> usize {
        self.loaded().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.loaded().is_empty()
    }

    pub fn get(&mut self, id: &str) -> Option<&Workout> {
        self.loaded().iter().find(|w| w.id == id)
    }

    pub fn ids(&mut self) -> HashSet<String> {
        self.loaded().iter().map(|w| w.id.clone()).collect()
    }

    pub fn create(
        &mut self,
        name: &str,
        exercises: Vec<Exercise>,
    ) -> PlannerResult<Workout> {
        self.loaded();
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::Validation(
                "workout name must not be empty".into(),
            ));
        }

        let workout = Workout::new(name, exercises);
        self.loaded().push(workout.clone());
        if let Err(err) = self.persist() {
            self.loaded().pop();
            return Err(err);
        }
        info!(
            id = %workout.id,
            name = %workout.name,
            exercises = workout.exercises.len(),
            "created workout"
        );
        Ok(workout)
    }

    /// Remove the workout with `id` and prune it from `schedule`.
    ///
    /// Returns `false` without touching either store when no such workout exists.
    pub fn delete<Y: ScheduleSync + ?Sized>(
        &mut self,
        id: &str,
        schedule: &mut Y,
    ) -> PlannerResult<bool> {
        let Some(position) = self.loaded().iter().position(|w| w.id == id) else {
            debug!(id, "delete requested for unknown workout");
            return Ok(false);
        };
        self.remove_at(position, schedule)?;
        Ok(true)
    }

    /// Remove the workout at list position `index` and prune it from `schedule`.
    pub fn delete_at<Y: ScheduleSync + ?Sized>(
        &mut self,
        index: usize,
        schedule: &mut Y,
    ) -> PlannerResult<Workout> {
        let len = self.loaded().len();
        if index >= len {
            return Err(PlannerError::OutOfRange {
                context: "workouts".into(),
                index,
                len,
            });
        }
        self.remove_at(index, schedule)
    }

    /// Replace the whole collection, e.g. when restoring a backup.
    pub(crate) fn replace_all(&mut self, workouts: Vec<Workout>) -> PlannerResult<()> {
        validate_workouts(&workouts).map_err(|err| PlannerError::Validation(err.to_string()))?;
        let previous = std::mem::replace(self.loaded(), workouts);
        if let Err(err) = self.persist() {
            *self.loaded() = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn take_notices(&mut self) -> Vec<LoadNotice> {
        std::mem::take(&mut self.notices)
    }

    fn remove_at<Y: ScheduleSync + ?Sized>(
        &mut self,
        position: usize,
        schedule: &mut Y,
    ) -> PlannerResult<Workout> {
        let removed = self.loaded().remove(position);
        if let Err(err) = self.persist() {
            self.loaded().insert(position, removed);
            return Err(err);
        }
        let live = self.ids();
        let report = schedule.synchronize(&live)?;
        info!(
            id = %removed.id,
            name = %removed.name,
            pruned_entries = report.removed_entries,
            pruned_dates = report.removed_dates,
            "deleted workout"
        );
        Ok(removed)
    }

    fn persist(&mut self) -> PlannerResult<()> {
        let bytes = encode_json(self.loaded().as_slice())?;
        self.store.save(WORKOUTS_KEY, &bytes)?;
        self.degraded = false;
        Ok(())
    }

    fn loaded(&mut self) -> &mut Vec<Workout> {
        if let RepositoryState::Unloaded = self.state {
            let before = self.notices.len();
            let workouts = cold_load(self.store.as_ref(), &mut self.notices);
            self.degraded = self.notices.len() > before;
            self.state = RepositoryState::Loaded(workouts);
        }
        match &mut self.state {
            RepositoryState::Loaded(workouts) => workouts,
            RepositoryState::Unloaded => unreachable!("repository state was just loaded"),
        }
    }
}

fn cold_load<S: KeyValueStore + ?Sized>(store: &S, notices: &mut Vec<LoadNotice>) -> Vec<Workout> {
    let bytes = match store.load(WORKOUTS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!("no stored workouts; starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(error = %err, "could not read stored workouts; starting empty");
            notices.push(LoadNotice::new(WORKOUTS_KEY, err.to_string()));
            return Vec::new();
        }
    };

    let decoded = decode_json::<Vec<Workout>>(&bytes)
        .map_err(|err| err.to_string())
        .and_then(|workouts| {
            validate_workouts(&workouts)
                .map(|_| workouts)
                .map_err(|err| err.to_string())
        });
    match decoded {
        Ok(workouts) => {
            debug!(count = workouts.len(), "loaded workouts");
            workouts
        }
        Err(message) => {
            warn!(error = %message, "stored workouts are unreadable; starting empty");
            notices.push(LoadNotice::new(WORKOUTS_KEY, message));
            Vec::new()
        }
    }
}

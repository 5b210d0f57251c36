use crate::calendar::{DateKey, week_containing};
use crate::error::{LoadNotice, PlannerError, PlannerResult};
use crate::exercise::Exercise;
use crate::persistence::{KeyValueStore, PlannerSnapshot};
use crate::repository::WorkoutRepository;
use crate::schedule::{Schedule, ScheduleManager, SyncReport};
use crate::workout::Workout;
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tracing::info;

/// The workout collection and the schedule, opened over one store.
pub struct Planner<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    workouts: WorkoutRepository<S>,
    schedule: ScheduleManager<S>,
}

impl<S: KeyValueStore + ?Sized> Planner<S> {
    /// Load workouts, then open the schedule against the loaded ids.
    pub fn open(store: Arc<S>) -> Self {
        let mut workouts = WorkoutRepository::new(Arc::clone(&store));
        let schedule = open_schedule(&store, &mut workouts);
        Self {
            store,
            workouts,
            schedule,
        }
    }

    /// Throw away in-memory state and repeat the cold load.
    pub fn reload(&mut self) {
        self.workouts.reload();
        self.schedule = open_schedule(&self.store, &mut self.workouts);
    }

    pub fn workouts(&mut self) -> &[Workout] {
        self.workouts.list()
    }

    pub fn workout(&mut self, id: &str) -> Option<&Workout> {
        self.workouts.get(id)
    }

    /// 0-based position lookup, as list views address rows.
    pub fn workout_at(&mut self, index: usize) -> PlannerResult<Workout> {
        let list = self.workouts.list();
        list.get(index).cloned().ok_or(PlannerError::OutOfRange {
            context: "workouts".into(),
            index,
            len: list.len(),
        })
    }

    pub fn create_workout(
        &mut self,
        name: &str,
        exercises: Vec<Exercise>,
    ) -> PlannerResult<Workout> {
        self.workouts.create(name, exercises)
    }

    pub fn delete_workout(&mut self, id: &str) -> PlannerResult<bool> {
        self.workouts.delete(id, &mut self.schedule)
    }

    pub fn delete_workout_at(&mut self, index: usize) -> PlannerResult<Workout> {
        self.workouts.delete_at(index, &mut self.schedule)
    }

    /// Assign a stored workout to `date`. Unknown ids are rejected so the
    /// schedule never gains a reference the collection cannot resolve.
    pub fn assign(&mut self, date: DateKey, workout_id: &str) -> PlannerResult<Workout> {
        let workout = self
            .workouts
            .get(workout_id)
            .cloned()
            .ok_or_else(|| PlannerError::UnknownWorkout(workout_id.to_string()))?;
        self.schedule.assign(date, workout.clone())?;
        Ok(workout)
    }

    pub fn unassign(&mut self, date: DateKey, index: usize) -> PlannerResult<Workout> {
        self.schedule.unassign(date, index)
    }

    pub fn workouts_for(&self, date: DateKey) -> &[Workout] {
        self.schedule.workouts_for(date)
    }

    pub fn schedule(&self) -> &Schedule {
        self.schedule.entries()
    }

    /// Scheduled dates in the `days`-long window starting at `from`. The
    /// window stops at the last representable date.
    pub fn upcoming(&self, from: DateKey, days: u32) -> Vec<(DateKey, &[Workout])> {
        if days == 0 {
            return Vec::new();
        }
        let end = from
            .date()
            .checked_add_days(Days::new(u64::from(days) - 1))
            .unwrap_or(NaiveDate::MAX);
        self.schedule.workouts_between(from, DateKey::new(end))
    }

    /// Monday..Sunday around `date`, including empty days.
    pub fn week(&self, date: DateKey) -> Vec<(DateKey, &[Workout])> {
        week_containing(date)
            .into_iter()
            .map(|day| (day, self.schedule.workouts_for(day)))
            .collect()
    }

    pub fn snapshot(&mut self) -> PlannerSnapshot {
        PlannerSnapshot {
            workouts: self.workouts.list().to_vec(),
            schedule: self.schedule.entries().clone(),
        }
    }

    /// Overwrite both collections from a backup, then prune the schedule
    /// against the restored workouts.
    pub fn restore(&mut self, snapshot: PlannerSnapshot) -> PlannerResult<SyncReport> {
        self.workouts.replace_all(snapshot.workouts)?;
        let live = self.workouts.ids();
        let report = self.schedule.replace_all(snapshot.schedule, &live)?;
        info!(
            workouts = live.len(),
            pruned_entries = report.removed_entries,
            "restored planner snapshot"
        );
        Ok(report)
    }

    /// Drain non-fatal load notices from both collections.
    pub fn take_notices(&mut self) -> Vec<LoadNotice> {
        let mut notices = self.workouts.take_notices();
        notices.extend(self.schedule.take_notices());
        notices
    }
}

/// Stored workouts that failed to load must not prune the stored schedule.
fn open_schedule<S: KeyValueStore + ?Sized>(
    store: &Arc<S>,
    workouts: &mut WorkoutRepository<S>,
) -> ScheduleManager<S> {
    let live = workouts.ids();
    if workouts.is_degraded() {
        ScheduleManager::open_deferred(Arc::clone(store), &live)
    } else {
        ScheduleManager::open(Arc::clone(store), &live)
    }
}

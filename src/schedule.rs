use crate::calendar::DateKey;
use crate::error::{LoadNotice, PlannerError, PlannerResult};
use crate::persistence::{KeyValueStore, SCHEDULE_KEY, decode_json, encode_json};
use crate::workout::Workout;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Date → workouts assigned to that date, in assignment order.
pub type Schedule = BTreeMap<DateKey, Vec<Workout>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub removed_entries: usize,
    pub removed_dates: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.removed_entries == 0 && self.removed_dates == 0
    }
}

/// Anything holding workout references that must be pruned when workouts go away.
pub trait ScheduleSync {
    fn synchronize(&mut self, live_ids: &HashSet<String>) -> PlannerResult<SyncReport>;
}

/// Owns the schedule mapping and keeps it consistent with the workout collection.
///
/// Every entry is a full copy of a [`Workout`]; after [`ScheduleManager::open`]
/// and after every [`ScheduleSync::synchronize`] each entry's id is present in
/// the id set the caller supplied, and no date maps to an empty list.
pub struct ScheduleManager<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    entries: Schedule,
    notices: Vec<LoadNotice>,
}

enum ColdLoad {
    Absent,
    Loaded(Schedule),
    Unreadable,
}

impl<S: KeyValueStore + ?Sized> ScheduleManager<S> {
    /// Read the stored schedule and immediately prune entries whose workout is
    /// not in `live_ids`, writing the pruned result back.
    ///
    /// The two collections are written separately, so a schedule written before
    /// an interrupted delete can still reference the deleted workout; opening
    /// always heals that. An unreadable schedule is replaced by an empty one in
    /// memory and left untouched on disk. A failed healing write is recorded as
    /// a notice and retried by the next mutation.
    pub fn open(store: Arc<S>, live_ids: &HashSet<String>) -> Self {
        Self::open_with(store, live_ids, true)
    }

    /// Like [`ScheduleManager::open`] but prunes in memory only. Used when
    /// `live_ids` comes from a workout collection that could not be read, so
    /// the stored schedule survives until the workouts are readable again.
    pub fn open_deferred(store: Arc<S>, live_ids: &HashSet<String>) -> Self {
        Self::open_with(store, live_ids, false)
    }

    fn open_with(store: Arc<S>, live_ids: &HashSet<String>, write_back: bool) -> Self {
        let mut notices = Vec::new();
        let loaded = cold_load(store.as_ref(), &mut notices);
        let mut manager = Self {
            store,
            entries: Schedule::new(),
            notices,
        };
        let ColdLoad::Loaded(entries) = loaded else {
            return manager;
        };
        manager.entries = entries;
        let report = manager.prune(live_ids);
        if !report.is_noop() {
            info!(
                pruned_entries = report.removed_entries,
                pruned_dates = report.removed_dates,
                persisted = write_back,
                "healed stale schedule entries on load"
            );
        }
        if !write_back {
            debug!("skipped schedule write while workouts are unreadable");
            return manager;
        }
        if let Err(err) = manager.persist() {
            warn!(error = %err, "could not write healed schedule");
            manager.notices.push(LoadNotice::new(SCHEDULE_KEY, err.to_string()));
        }
        manager
    }

    pub fn entries(&self) -> &Schedule {
        &self.entries
    }

    pub fn dates(&self) -> impl Iterator<Item = &DateKey> {
        self.entries.keys()
    }

    pub fn workouts_for(&self, date: DateKey) -> &[Workout] {
        self.entries
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dates in `start..=end` that have at least one workout, ascending.
    pub fn workouts_between(&self, start: DateKey, end: DateKey) -> Vec<(DateKey, &[Workout])> {
        if start > end {
            return Vec::new();
        }
        self.entries
            .range(start..=end)
            .map(|(date, workouts)| (*date, workouts.as_slice()))
            .collect()
    }

    pub fn total_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Append `workout` to `date`. Assigning the same workout twice yields two entries.
    pub fn assign(&mut self, date: DateKey, workout: Workout) -> PlannerResult<()> {
        let id = workout.id.clone();
        self.entries.entry(date).or_default().push(workout);
        if let Err(err) = self.persist() {
            if let Some(list) = self.entries.get_mut(&date) {
                list.pop();
                if list.is_empty() {
                    self.entries.remove(&date);
                }
            }
            return Err(err);
        }
        info!(date = %date, workout = %id, "assigned workout");
        Ok(())
    }

    /// Remove the entry at `index` on `date`, dropping the date once its list is empty.
    pub fn unassign(&mut self, date: DateKey, index: usize) -> PlannerResult<Workout> {
        let len = self.entries.get(&date).map_or(0, Vec::len);
        if index >= len {
            return Err(PlannerError::OutOfRange {
                context: format!("schedule {date}"),
                index,
                len,
            });
        }

        let list = self.entries.entry(date).or_default();
        let removed = list.remove(index);
        if list.is_empty() {
            self.entries.remove(&date);
        }
        if let Err(err) = self.persist() {
            self.entries
                .entry(date)
                .or_default()
                .insert(index, removed);
            return Err(err);
        }
        info!(date = %date, index, workout = %removed.id, "unassigned workout");
        Ok(removed)
    }

    /// Replace the whole mapping (backup restore) and prune it against `live_ids`.
    pub(crate) fn replace_all(
        &mut self,
        entries: Schedule,
        live_ids: &HashSet<String>,
    ) -> PlannerResult<SyncReport> {
        self.entries = entries;
        self.synchronize(live_ids)
    }

    pub fn take_notices(&mut self) -> Vec<LoadNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Drop entries outside `live_ids` and any date left empty. Memory only.
    fn prune(&mut self, live_ids: &HashSet<String>) -> SyncReport {
        let mut report = SyncReport::default();
        self.entries.retain(|_, workouts| {
            let before = workouts.len();
            workouts.retain(|w| live_ids.contains(&w.id));
            report.removed_entries += before - workouts.len();
            if workouts.is_empty() {
                report.removed_dates += 1;
                false
            } else {
                true
            }
        });
        report
    }

    fn persist(&self) -> PlannerResult<()> {
        let bytes = encode_json(&self.entries)?;
        self.store.save(SCHEDULE_KEY, &bytes)?;
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> ScheduleSync for ScheduleManager<S> {
    fn synchronize(&mut self, live_ids: &HashSet<String>) -> PlannerResult<SyncReport> {
        let report = self.prune(live_ids);
        self.persist()?;
        debug!(
            removed_entries = report.removed_entries,
            removed_dates = report.removed_dates,
            "synchronized schedule"
        );
        Ok(report)
    }
}

fn cold_load<S: KeyValueStore + ?Sized>(store: &S, notices: &mut Vec<LoadNotice>) -> ColdLoad {
    let bytes = match store.load(SCHEDULE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!("no stored schedule; starting empty");
            return ColdLoad::Absent;
        }
        Err(err) => {
            warn!(error = %err, "could not read stored schedule; starting empty");
            notices.push(LoadNotice::new(SCHEDULE_KEY, err.to_string()));
            return ColdLoad::Unreadable;
        }
    };

    let raw: BTreeMap<String, Vec<Workout>> = match decode_json(&bytes) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "stored schedule is unreadable; starting empty");
            notices.push(LoadNotice::new(SCHEDULE_KEY, err.to_string()));
            return ColdLoad::Unreadable;
        }
    };

    ColdLoad::Loaded(canonicalize_keys(raw, notices))
}

/// Map stored keys (possibly legacy display-formatted) onto canonical date keys.
/// Keys naming the same date are merged in stored key order; unparseable keys
/// are dropped.
fn canonicalize_keys(
    raw: BTreeMap<String, Vec<Workout>>,
    notices: &mut Vec<LoadNotice>,
) -> Schedule {
    let mut entries = Schedule::new();
    for (key, workouts) in raw {
        match key.parse::<DateKey>() {
            Ok(date) => {
                if !DateKey::is_canonical(&key) {
                    debug!(legacy = %key, canonical = %date, "migrated legacy schedule key");
                }
                entries.entry(date).or_default().extend(workouts);
            }
            Err(err) => {
                warn!(
                    key = %key,
                    dropped = workouts.len(),
                    "dropping schedule entry with unrecognised date key"
                );
                notices.push(LoadNotice::new(SCHEDULE_KEY, err.to_string()));
            }
        }
    }
    entries
}

mod common;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use common::{FlakyStore, bench_press, shoulder_press, squat};
use workout_tracker::{
    DateKey, KeyValueStore, MemoryStore, Planner, PlannerError, PlannerSnapshot, SCHEDULE_KEY,
    Schedule, WORKOUTS_KEY, Workout,
};

fn d(y: i32, m: u32, day: u32) -> DateKey {
    DateKey::from_ymd(y, m, day).unwrap()
}

/// Every scheduled workout id is in the collection and no date is empty.
fn assert_consistent(planner: &mut Planner<MemoryStore>) {
    let live: HashSet<String> = planner.workouts().iter().map(|w| w.id.clone()).collect();
    for (date, workouts) in planner.schedule() {
        assert!(!workouts.is_empty(), "{date} maps to an empty list");
        for w in workouts {
            assert!(live.contains(&w.id), "{date} references missing workout {}", w.id);
        }
    }
}

#[test]
fn create_push_day_and_read_it_back() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store.clone());

    let push = planner
        .create_workout("Push Day", vec![bench_press(), shoulder_press()])
        .unwrap();
    assert_eq!(planner.workouts().len(), 1);
    assert_eq!(planner.workout(&push.id).unwrap().exercises.len(), 2);

    let mut reopened = Planner::open(store);
    assert_eq!(reopened.workouts(), &[push]);
}

#[test]
fn empty_name_is_rejected_without_changes() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store.clone());

    let err = planner.create_workout("", vec![bench_press()]).unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
    assert!(planner.workouts().is_empty());
    assert!(!store.contains(WORKOUTS_KEY));
}

#[test]
fn delete_cascades_into_schedule() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store.clone());
    let w1 = planner.create_workout("W1", vec![bench_press()]).unwrap();
    let w2 = planner.create_workout("W2", vec![squat()]).unwrap();

    let d1 = d(2024, 12, 1);
    let d2 = d(2024, 12, 2);
    planner.assign(d1, &w1.id).unwrap();
    planner.assign(d1, &w2.id).unwrap();
    planner.assign(d2, &w1.id).unwrap();

    assert!(planner.delete_workout(&w1.id).unwrap());

    assert_eq!(planner.workouts_for(d1), &[w2.clone()]);
    assert!(!planner.schedule().contains_key(&d2));
    assert_consistent(&mut planner);

    let mut reopened = Planner::open(store);
    assert_eq!(reopened.schedule().len(), 1);
    assert_consistent(&mut reopened);
}

#[test]
fn delete_by_position_cascades_too() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);
    let w1 = planner.create_workout("W1", vec![bench_press()]).unwrap();
    planner.create_workout("W2", vec![squat()]).unwrap();
    planner.assign(d(2024, 12, 1), &w1.id).unwrap();

    let removed = planner.delete_workout_at(0).unwrap();
    assert_eq!(removed, w1);
    assert!(planner.schedule().is_empty());

    let err = planner.delete_workout_at(4).unwrap_err();
    assert!(matches!(err, PlannerError::OutOfRange { index: 4, len: 1, .. }));
}

#[test]
fn deleting_unknown_id_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);
    let w1 = planner.create_workout("W1", vec![bench_press()]).unwrap();
    planner.assign(d(2024, 12, 1), &w1.id).unwrap();

    assert!(!planner.delete_workout("missing").unwrap());
    assert_eq!(planner.workouts().len(), 1);
    assert_eq!(planner.schedule().len(), 1);
}

#[test]
fn assigning_unknown_workout_is_rejected() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);

    let err = planner.assign(d(2024, 12, 1), "missing").unwrap_err();
    assert!(matches!(err, PlannerError::UnknownWorkout(id) if id == "missing"));
    assert!(planner.schedule().is_empty());
}

#[test]
fn reopening_heals_drift_left_by_interrupted_delete() {
    let store = Arc::new(MemoryStore::new());
    let (kept, stale) = {
        let mut planner = Planner::open(store.clone());
        let kept = planner.create_workout("Kept", vec![bench_press()]).unwrap();
        let stale = planner.create_workout("Stale", vec![squat()]).unwrap();
        planner.assign(d(2024, 12, 1), &kept.id).unwrap();
        planner.assign(d(2024, 12, 1), &stale.id).unwrap();
        planner.assign(d(2024, 12, 2), &stale.id).unwrap();
        (kept, stale)
    };

    // Collection written without the stale workout; schedule left as it was.
    store
        .save(WORKOUTS_KEY, &serde_json::to_vec(&vec![kept.clone()]).unwrap())
        .unwrap();

    let mut planner = Planner::open(store.clone());
    assert_consistent(&mut planner);
    assert_eq!(planner.workouts_for(d(2024, 12, 1)), &[kept]);
    assert!(planner.workouts_for(d(2024, 12, 2)).is_empty());

    let raw: BTreeMap<String, Vec<Workout>> =
        serde_json::from_slice(&store.load(SCHEDULE_KEY).unwrap().unwrap()).unwrap();
    assert!(raw.values().flatten().all(|w| w.id != stale.id));
}

#[test]
fn corrupt_collection_yields_notice_and_is_not_overwritten() {
    let store = Arc::new(MemoryStore::new());
    store.save(WORKOUTS_KEY, b"not json at all").unwrap();

    let mut planner = Planner::open(store.clone());
    assert!(planner.workouts().is_empty());

    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, WORKOUTS_KEY);
    assert!(planner.take_notices().is_empty());
    assert_eq!(store.load(WORKOUTS_KEY).unwrap().unwrap(), b"not json at all");
}

#[test]
fn unreadable_workouts_do_not_erase_stored_schedule() {
    let store = Arc::new(FlakyStore::default());
    let day = d(2024, 12, 20);
    let push = {
        let mut planner = Planner::open(store.clone());
        let push = planner.create_workout("Push Day", vec![bench_press()]).unwrap();
        planner.assign(day, &push.id).unwrap();
        push
    };
    let stored_schedule = store.raw(SCHEDULE_KEY).unwrap();

    store.fail_workout_reads(true);
    let mut planner = Planner::open(store.clone());
    assert!(planner.workouts().is_empty());
    assert!(planner.workouts_for(day).is_empty());
    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, WORKOUTS_KEY);
    assert_eq!(store.raw(SCHEDULE_KEY).unwrap(), stored_schedule);

    store.fail_workout_reads(false);
    let planner = Planner::open(store.clone());
    assert_eq!(planner.workouts_for(day), &[push]);
}

#[test]
fn failed_healing_write_becomes_a_notice() {
    let store = Arc::new(FlakyStore::default());
    let day = d(2024, 12, 20);
    {
        let mut planner = Planner::open(store.clone());
        let kept = planner.create_workout("Kept", vec![bench_press()]).unwrap();
        let gone = planner.create_workout("Gone", vec![squat()]).unwrap();
        planner.assign(day, &kept.id).unwrap();
        planner.assign(day, &gone.id).unwrap();
        // Leave the schedule behind as an interrupted delete would.
        let bytes = serde_json::to_vec(&vec![kept]).unwrap();
        store.save(WORKOUTS_KEY, &bytes).unwrap();
    }

    store.fail_writes(true);
    let mut planner = Planner::open(store.clone());
    assert_eq!(planner.workouts_for(day).len(), 1);
    let notices = planner.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, SCHEDULE_KEY);

    store.fail_writes(false);
    let mut planner = Planner::open(store);
    assert_eq!(planner.workouts_for(day).len(), 1);
    assert!(planner.take_notices().is_empty());
}

#[test]
fn unassign_removes_single_entry() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);
    let push = planner.create_workout("Push Day", vec![bench_press()]).unwrap();
    let day = d(2024, 12, 20);
    planner.assign(day, &push.id).unwrap();
    planner.assign(day, &push.id).unwrap();

    planner.unassign(day, 1).unwrap();
    assert_eq!(planner.workouts_for(day).len(), 1);
    assert!(planner.unassign(day, 1).is_err());
}

#[test]
fn upcoming_and_week_views() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);
    let push = planner.create_workout("Push Day", vec![bench_press()]).unwrap();
    planner.assign(d(2025, 1, 6), &push.id).unwrap();
    planner.assign(d(2025, 1, 8), &push.id).unwrap();
    planner.assign(d(2025, 1, 20), &push.id).unwrap();

    let next = planner.upcoming(d(2025, 1, 6), 7);
    assert_eq!(next.len(), 2);
    assert!(planner.upcoming(d(2025, 1, 6), 0).is_empty());
    assert_eq!(planner.upcoming(d(2024, 1, 1), u32::MAX).len(), 3);

    let last_day = DateKey::new(chrono::NaiveDate::MAX);
    assert!(planner.week(last_day).len() <= 7);

    let week = planner.week(d(2025, 1, 9));
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].0, d(2025, 1, 6));
    assert_eq!(week[0].1.len(), 1);
    assert!(week[1].1.is_empty());
    assert_eq!(week[2].1.len(), 1);
}

#[test]
fn restore_replaces_both_collections_and_prunes() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store.clone());
    planner.create_workout("Old", vec![squat()]).unwrap();

    let legs = Workout::new("Leg Day", vec![squat()]);
    let orphan = Workout::new("Orphan", vec![bench_press()]);
    let mut schedule = Schedule::new();
    schedule.insert(d(2025, 2, 1), vec![legs.clone(), orphan.clone()]);
    schedule.insert(d(2025, 2, 2), vec![orphan]);

    let report = planner
        .restore(PlannerSnapshot {
            workouts: vec![legs.clone()],
            schedule,
        })
        .unwrap();
    assert_eq!(report.removed_entries, 2);
    assert_eq!(report.removed_dates, 1);
    assert_eq!(planner.workouts(), &[legs.clone()]);

    let mut reopened = Planner::open(store);
    assert_eq!(reopened.snapshot().workouts, vec![legs.clone()]);
    assert_eq!(reopened.workouts_for(d(2025, 2, 1)), &[legs]);
}

#[test]
fn restore_rejects_duplicate_ids() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store);
    let existing = planner.create_workout("Keep me", vec![]).unwrap();

    let a = Workout::with_id("dup", "A", vec![]);
    let b = Workout::with_id("dup", "B", vec![]);
    let err = planner
        .restore(PlannerSnapshot {
            workouts: vec![a, b],
            schedule: Schedule::new(),
        })
        .unwrap_err();
    assert!(matches!(err, PlannerError::Validation(_)));
    assert_eq!(planner.workouts(), &[existing]);
}

#[test]
fn reload_picks_up_external_changes() {
    let store = Arc::new(MemoryStore::new());
    let mut planner = Planner::open(store.clone());
    let mut other = Planner::open(store);

    other.create_workout("From elsewhere", vec![]).unwrap();
    assert!(planner.workouts().is_empty());
    planner.reload();
    assert_eq!(planner.workouts().len(), 1);
}

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use workout_tracker::{
    Exercise, KeyValueStore, MemoryStore, PersistenceError, PersistenceResult, WORKOUTS_KEY,
};

pub fn bench_press() -> Exercise {
    Exercise::new("0025", "barbell bench press").with_body_part("chest")
}

pub fn shoulder_press() -> Exercise {
    Exercise::new("0405", "dumbbell shoulder press").with_body_part("shoulders")
}

pub fn squat() -> Exercise {
    Exercise::new("0043", "barbell full squat").with_body_part("upper legs")
}

/// Memory store whose writes, or reads of the workout collection, can be
/// switched off to simulate a full disk or exhausted file handles.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
    fail_workout_reads: AtomicBool,
}

impl FlakyStore {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_workout_reads(&self, fail: bool) {
        self.fail_workout_reads.store(fail, Ordering::SeqCst);
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.load(key).ok().flatten()
    }
}

impl KeyValueStore for FlakyStore {
    fn save(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::InvalidData("disk full".into()));
        }
        self.inner.save(key, bytes)
    }

    fn load(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        if key == WORKOUTS_KEY && self.fail_workout_reads.load(Ordering::SeqCst) {
            return Err(io::Error::other("EMFILE").into());
        }
        self.inner.load(key)
    }

    fn remove(&self, key: &str) -> PersistenceResult<()> {
        self.inner.remove(key)
    }
}

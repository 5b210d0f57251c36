pub mod calendar;
#[cfg(feature = "catalog")]
pub mod catalog;
pub mod config;
pub mod error;
pub mod exercise;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod planner;
pub mod profile;
pub mod repository;
pub mod schedule;
pub mod workout;

pub use calendar::{DateKey, InvalidDateKey, days_in_range, week_containing};
#[cfg(feature = "catalog")]
pub use catalog::{CatalogConfig, CatalogError, ExerciseCatalog, ReqwestCatalogClient};
pub use config::{AppConfig, ConfigError, StorageBackend};
pub use error::{LoadNotice, PlannerError, PlannerResult};
pub use exercise::{BODY_PARTS, BodyPartFilter, Exercise, filter_by_body_part};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    FileStore, KeyValueStore, MemoryStore, PROFILE_KEY, PersistenceError, PersistenceResult,
    PlannerSnapshot, SCHEDULE_KEY, WORKOUTS_KEY, load_snapshot_from_json, save_schedule_to_csv,
    save_snapshot_to_json,
};
pub use planner::Planner;
pub use profile::{ProfileStore, UserProfile};
pub use repository::WorkoutRepository;
pub use schedule::{Schedule, ScheduleManager, ScheduleSync, SyncReport};
pub use workout::{Workout, WorkoutValidationError, validate_workouts};

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::{
    DateKey, Exercise, KeyValueStore, Planner, PlannerError, ProfileStore, Schedule, UserProfile,
    Workout,
};

type SharedPlanner = Arc<Mutex<Planner<dyn KeyValueStore>>>;
type SharedProfile = Arc<Mutex<ProfileStore<dyn KeyValueStore>>>;

#[derive(Clone)]
pub struct AppState {
    planner: SharedPlanner,
    profile: SharedProfile,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let planner = Planner::open(Arc::clone(&store));
        Self {
            planner: Arc::new(Mutex::new(planner)),
            profile: Arc::new(Mutex::new(ProfileStore::new(store))),
        }
    }

    fn planner(&self) -> SharedPlanner {
        self.planner.clone()
    }

    fn profile(&self) -> SharedProfile {
        self.profile.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Unprocessable(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PlannerError> for ApiError {
    fn from(value: PlannerError) -> Self {
        match value {
            PlannerError::Validation(_) => ApiError::Invalid(value.to_string()),
            PlannerError::UnknownWorkout(_) => ApiError::NotFound(value.to_string()),
            PlannerError::OutOfRange { .. } => ApiError::Unprocessable(value.to_string()),
            PlannerError::Decode(_) | PlannerError::Persistence(_) => {
                error!(error = %value, "planner storage failure");
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Unprocessable(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "out_of_range", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateWorkoutPayload {
    name: String,
    #[serde(default)]
    exercises: Vec<Exercise>,
}

#[derive(Debug, Deserialize)]
struct AssignPayload {
    workout_id: String,
}

fn parse_date(raw: &str) -> Result<DateKey, ApiError> {
    raw.parse::<DateKey>()
        .map_err(|err| ApiError::invalid(err.to_string()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workouts", get(list_workouts).post(create_workout))
        .route("/workouts/:id", get(get_workout).delete(delete_workout))
        .route("/schedule", get(get_schedule))
        .route("/schedule/:date", get(workouts_for_date).post(assign_workout))
        .route("/schedule/:date/:index", delete(unassign_workout))
        .route("/profile", get(get_profile).put(update_profile))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_workouts(State(state): State<AppState>) -> Json<Vec<Workout>> {
    let planner = state.planner();
    let workouts = {
        let mut guard = planner.lock();
        guard.workouts().to_vec()
    };
    Json(workouts)
}

async fn get_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Workout>, ApiError> {
    let planner = state.planner();
    let found = {
        let mut guard = planner.lock();
        guard.workout(&id).cloned()
    };
    found
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("workout {id} not found")))
}

async fn create_workout(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkoutPayload>,
) -> Result<(StatusCode, Json<Workout>), ApiError> {
    let planner = state.planner();
    let created = {
        let mut guard = planner.lock();
        guard.create_workout(&payload.name, payload.exercises)?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_workout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let planner = state.planner();
    let removed = {
        let mut guard = planner.lock();
        guard.delete_workout(&id)?
    };
    if !removed {
        return Err(ApiError::not_found(format!("workout {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_schedule(State(state): State<AppState>) -> Json<Schedule> {
    let planner = state.planner();
    let schedule = {
        let guard = planner.lock();
        guard.schedule().clone()
    };
    Json(schedule)
}

async fn workouts_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Workout>>, ApiError> {
    let date = parse_date(&date)?;
    let planner = state.planner();
    let workouts = {
        let guard = planner.lock();
        guard.workouts_for(date).to_vec()
    };
    Ok(Json(workouts))
}

async fn assign_workout(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<AssignPayload>,
) -> Result<(StatusCode, Json<Vec<Workout>>), ApiError> {
    let date = parse_date(&date)?;
    let planner = state.planner();
    let workouts = {
        let mut guard = planner.lock();
        guard.assign(date, &payload.workout_id)?;
        guard.workouts_for(date).to_vec()
    };
    Ok((StatusCode::CREATED, Json(workouts)))
}

async fn unassign_workout(
    State(state): State<AppState>,
    Path((date, index)): Path<(String, usize)>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date(&date)?;
    let planner = state.planner();
    {
        let mut guard = planner.lock();
        guard.unassign(date, index)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_profile(State(state): State<AppState>) -> Json<UserProfile> {
    let profile = state.profile();
    let current = {
        let mut guard = profile.lock();
        guard.load()
    };
    Json(current)
}

async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<UserProfile>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.profile();
    {
        let guard = profile.lock();
        guard.save(&update)?;
    }
    Ok(Json(update))
}

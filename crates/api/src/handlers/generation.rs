//! Handlers for the video generation job lifecycle.
//!
//! Routes:
//! - `POST /generate-video`    — create a job and schedule processing
//! - `GET  /generation/{id}`   — job status and result
//! - `GET  /generations`       — recent jobs, newest first

use axum::extract::{Path, State};
use axum::Json;
use charvid_core::job::{Job, NewJob};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::jobs::processor;
use crate::state::AppState;

/// Upper bound on jobs returned by the listing endpoint.
const MAX_LISTED_JOBS: usize = 10;

fn default_duration() -> u32 {
    5
}

fn default_quality() -> String {
    "768".to_string()
}

/// Request body for starting a generation job.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    /// Locator returned by the upload endpoint.
    #[validate(length(min = 1, message = "characterImageUrl must not be empty"))]
    pub character_image_url: String,
    #[validate(length(min = 1, message = "script must not be empty"))]
    pub script: String,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 60, message = "duration must be between 1 and 60 seconds"))]
    pub duration: u32,
    #[serde(default = "default_quality")]
    pub quality: String,
}

/// POST /generate-video
///
/// Creates a `pending` job, schedules its processor off the request
/// path, and returns immediately. Clients poll `GET /generation/{id}`
/// and branch on `status`.
pub async fn generate_video(
    State(state): State<AppState>,
    Json(input): Json<GenerateVideoRequest>,
) -> AppResult<Json<Job>> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let job = state
        .store
        .create(NewJob {
            character_image_url: input.character_image_url,
            script: input.script,
            duration: input.duration,
            quality: input.quality,
        })
        .await;

    tracing::info!(job_id = %job.id, "Generation job created");

    // Fire-and-forget: the submitting client never blocks on completion.
    let _handle = processor::spawn(state.clone(), job.id);

    Ok(Json(job))
}

/// GET /generation/{id}
///
/// Returns the job or a 404 if the id is unknown.
pub async fn get_generation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Job>> {
    let job = state.store.get(id).await?;
    Ok(Json(job))
}

/// GET /generations
///
/// Returns up to 10 jobs, most recent first.
pub async fn list_generations(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.store.list(MAX_LISTED_JOBS).await)
}

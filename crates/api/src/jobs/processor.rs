//! Per-job background processor.
//!
//! Drives one job from `pending` to a terminal state: claims it
//! (`processing`), obtains video bytes from the inference API (or the
//! fallback generator when no token is configured), persists the
//! artifact, and records the outcome. The spawned task is the terminal
//! sink for every error on this path — nothing propagates past it.

use std::time::Duration;

use charvid_core::error::CoreError;
use charvid_core::fallback;
use charvid_core::job::{JobStatus, JobUpdate};
use charvid_core::naming;
use charvid_svd::{fetch_with_retry, FetchError, GenerationParams};
use uuid::Uuid;

use crate::state::AppState;

/// Errors from the processing stages. All of them terminalize the job
/// as `failed`; none are surfaced to HTTP callers directly.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The character image referenced by the job does not exist.
    #[error("character image not found: {0}")]
    MissingAsset(String),

    /// The inference call failed after exhausting its retry budget, or
    /// with a non-retryable error.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The artifact write produced an empty file.
    #[error("generated video file is empty")]
    EmptyArtifact,

    /// A store operation failed (unknown id, illegal transition).
    #[error(transparent)]
    Store(#[from] CoreError),

    /// Filesystem failure while persisting the artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Schedule processing for a job, off the request/response cycle.
///
/// Returns the task handle; production callers drop it (fire and
/// forget), tests await it to observe the terminal state.
pub fn spawn(state: AppState, job_id: Uuid) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(state, job_id))
}

/// Drive one job to a terminal state.
///
/// Every error, including failures of the final store update, is logged
/// here and reduced to `status = failed`.
async fn run(state: AppState, job_id: Uuid) {
    if let Err(e) = state
        .store
        .update(
            job_id,
            JobUpdate {
                status: Some(JobStatus::Processing),
                ..Default::default()
            },
        )
        .await
    {
        tracing::error!(%job_id, error = %e, "Failed to claim job for processing");
        return;
    }

    match process(&state, job_id).await {
        Ok(video_url) => {
            tracing::info!(%job_id, %video_url, "Video generation completed");
            if let Err(e) = state
                .store
                .update(
                    job_id,
                    JobUpdate {
                        status: Some(JobStatus::Completed),
                        video_url: Some(video_url),
                    },
                )
                .await
            {
                tracing::error!(%job_id, error = %e, "Failed to record job completion");
            }
        }
        Err(e) => {
            tracing::error!(%job_id, error = %e, "Video generation failed");
            if let Err(e) = state
                .store
                .update(
                    job_id,
                    JobUpdate {
                        status: Some(JobStatus::Failed),
                        ..Default::default()
                    },
                )
                .await
            {
                tracing::error!(%job_id, error = %e, "Failed to record job failure");
            }
        }
    }
}

/// The fallible stages of processing, combined with `?` so the caller
/// can reduce any failure to a single terminal transition.
async fn process(state: &AppState, job_id: Uuid) -> Result<String, ProcessError> {
    let job = state.store.get(job_id).await?;

    let Some(svd) = &state.svd else {
        return fallback_generation(state, job_id).await;
    };

    let image_path = naming::upload_path(&state.config.uploads_dir, &job.character_image_url)
        .ok_or_else(|| ProcessError::MissingAsset(job.character_image_url.clone()))?;
    let image = tokio::fs::read(&image_path)
        .await
        .map_err(|_| ProcessError::MissingAsset(image_path.display().to_string()))?;

    let params = GenerationParams {
        duration_secs: job.duration,
        quality: job.quality.clone(),
    };

    let bytes = fetch_with_retry(svd, &image, &params, &state.retry).await?;

    write_artifact(state, job_id, &bytes).await
}

/// Produce the deterministic placeholder artifact through the same
/// persistence path as the real one.
async fn fallback_generation(state: &AppState, job_id: Uuid) -> Result<String, ProcessError> {
    tracing::warn!(%job_id, "No inference token configured, using fallback generator");

    let latency = state.config.mock_latency_secs;
    if latency > 0 {
        tokio::time::sleep(Duration::from_secs(latency)).await;
    }

    write_artifact(state, job_id, fallback::placeholder_mp4()).await
}

/// Persist video bytes under the job's deterministic filename and
/// verify the write produced a non-empty artifact.
async fn write_artifact(
    state: &AppState,
    job_id: Uuid,
    bytes: &[u8],
) -> Result<String, ProcessError> {
    let filename = naming::video_filename(job_id);
    let path = state.config.videos_dir.join(&filename);

    tokio::fs::write(&path, bytes).await?;

    let metadata = tokio::fs::metadata(&path).await?;
    if metadata.len() == 0 {
        return Err(ProcessError::EmptyArtifact);
    }

    Ok(naming::video_locator(&filename))
}

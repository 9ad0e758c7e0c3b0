//! Job model and status state machine.
//!
//! A [`Job`] represents one video-generation request from submission to a
//! terminal state. Wire names are camelCase to match the public API
//! contract (`characterImageUrl`, `videoUrl`, `createdAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a generation job.
///
/// Progression is monotonic: `pending -> processing -> {completed|failed}`.
/// `completed` and `failed` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether a transition from `self` to `next` is legal.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Wire name of the status, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One video-generation request and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Opaque unique identifier, assigned at creation.
    pub id: Uuid,
    /// Locator of the uploaded character image (e.g. `/uploads/character_....png`).
    pub character_image_url: String,
    /// Dialogue/action script supplied by the client.
    pub script: String,
    /// Requested clip duration in seconds.
    pub duration: u32,
    /// Requested output quality label (e.g. `"768"`).
    pub quality: String,
    /// Locator of the produced artifact; `Some` iff `status == Completed`.
    pub video_url: Option<String>,
    pub status: JobStatus,
    /// Creation timestamp, used only for ordering.
    pub created_at: DateTime<Utc>,
}

/// Immutable inputs for a new job. The store assigns `id`, `status`, and
/// `created_at`.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub character_image_url: String,
    pub script: String,
    pub duration: u32,
    pub quality: String,
}

/// Partial update applied atomically to a job by the store.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub video_url: Option<String>,
}

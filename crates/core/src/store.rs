//! Job store abstraction and the default in-memory backend.
//!
//! [`JobStore`] is the seam between HTTP handlers, the background job
//! processor, and whatever holds job records. The default
//! [`MemoryJobStore`] keeps everything in a process-wide map (cleared on
//! restart); a database- or cache-backed store can replace it without
//! touching controller logic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CoreError;
use crate::job::{Job, JobStatus, JobUpdate, NewJob};

/// Registry of generation jobs keyed by id.
///
/// Implementations must be safe for concurrent `create`/`get`/`update`/
/// `list` from multiple in-flight job processors, and must apply each
/// [`JobUpdate`] atomically: a reader never observes `completed` without
/// its `video_url`.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Allocate an id and insert a `pending` record.
    async fn create(&self, new: NewJob) -> Job;

    /// Look up a job by id.
    async fn get(&self, id: Uuid) -> Result<Job, CoreError>;

    /// Apply a partial update.
    ///
    /// Rejects illegal status transitions (any regression, or any
    /// transition out of a terminal state) with [`CoreError::Conflict`].
    /// `video_url` may only be set by the update that transitions the
    /// job to `completed`, so it is written exactly once. A rejected
    /// update leaves the record untouched.
    async fn update(&self, id: Uuid, update: JobUpdate) -> Result<Job, CoreError>;

    /// Up to `limit` jobs, most recent first (`created_at` descending,
    /// ties broken by insertion order, newest first).
    async fn list(&self, limit: usize) -> Vec<Job>;
}

/// Entry wrapper carrying the insertion sequence number used to break
/// `created_at` ties in [`JobStore::list`].
struct Entry {
    job: Job,
    seq: u64,
}

struct Inner {
    jobs: HashMap<Uuid, Entry>,
    next_seq: u64,
}

/// In-memory [`JobStore`] backed by a `RwLock`-guarded map.
///
/// The lock is held only for map operations; no await point sits inside
/// a critical section, so slow fetches and retry sleeps never block
/// store readers.
pub struct MemoryJobStore {
    inner: RwLock<Inner>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                jobs: HashMap::new(),
                next_seq: 0,
            }),
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, new: NewJob) -> Job {
        let job = Job {
            id: Uuid::new_v4(),
            character_image_url: new.character_image_url,
            script: new.script,
            duration: new.duration,
            quality: new.quality,
            video_url: None,
            status: JobStatus::Pending,
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.jobs.insert(
            job.id,
            Entry {
                job: job.clone(),
                seq,
            },
        );
        job
    }

    async fn get(&self, id: Uuid) -> Result<Job, CoreError> {
        let inner = self.inner.read().await;
        inner
            .jobs
            .get(&id)
            .map(|entry| entry.job.clone())
            .ok_or(CoreError::NotFound {
                entity: "Job",
                id: id.to_string(),
            })
    }

    async fn update(&self, id: Uuid, update: JobUpdate) -> Result<Job, CoreError> {
        let mut inner = self.inner.write().await;
        let entry = inner.jobs.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;

        // Validate the whole update before touching the record, so a
        // rejected update never leaves a partial write behind.
        if let Some(next) = update.status {
            if !entry.job.status.can_transition_to(next) {
                return Err(CoreError::Conflict(format!(
                    "Illegal job status transition: {} -> {}",
                    entry.job.status, next
                )));
            }
        }
        if update.video_url.is_some() && update.status != Some(JobStatus::Completed) {
            return Err(CoreError::Conflict(format!(
                "videoUrl may only be set when completing a job (status is {})",
                entry.job.status
            )));
        }

        if let Some(next) = update.status {
            entry.job.status = next;
        }
        if let Some(url) = update.video_url {
            entry.job.video_url = Some(url);
        }

        Ok(entry.job.clone())
    }

    async fn list(&self, limit: usize) -> Vec<Job> {
        let inner = self.inner.read().await;
        let mut entries: Vec<_> = inner
            .jobs
            .values()
            .map(|entry| (entry.job.created_at, entry.seq, entry.job.clone()))
            .collect();
        entries.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        entries.into_iter().take(limit).map(|(_, _, job)| job).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn new_job() -> NewJob {
        NewJob {
            character_image_url: "/uploads/character_a.png".to_string(),
            script: "walk left".to_string(),
            duration: 5,
            quality: "768".to_string(),
        }
    }

    #[tokio::test]
    async fn create_inserts_pending_job() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.video_url.is_none());

        let loaded = store.get(job.id).await.unwrap();
        assert_eq!(loaded.id, job.id);
        assert_eq!(loaded.script, "walk left");
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = MemoryJobStore::new();
        let result = store.get(Uuid::new_v4()).await;
        assert_matches!(result, Err(CoreError::NotFound { entity: "Job", .. }));
    }

    #[tokio::test]
    async fn update_walks_the_lifecycle() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        let job = store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Processing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Processing);

        let job = store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Completed),
                    video_url: Some("/videos/video_x.mp4".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.video_url.as_deref(), Some("/videos/video_x.mp4"));
    }

    #[tokio::test]
    async fn update_rejects_regression_from_terminal_state() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Processing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Failed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Failed is terminal: no further transition is accepted.
        let result = store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Processing),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        let loaded = store.get(job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn update_rejects_skipping_processing() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        let result = store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Completed),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn video_url_requires_completed() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        let result = store
            .update(
                job.id,
                JobUpdate {
                    video_url: Some("/videos/video_x.mp4".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        // The invariant holds: no videoUrl was persisted.
        let loaded = store.get(job.id).await.unwrap();
        assert!(loaded.video_url.is_none());
    }

    #[tokio::test]
    async fn video_url_cannot_be_rewritten_after_completion() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Processing),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Completed),
                    video_url: Some("/videos/video_x.mp4".to_string()),
                },
            )
            .await
            .unwrap();

        // A later url-only update must not replace the recorded artifact.
        let result = store
            .update(
                job.id,
                JobUpdate {
                    video_url: Some("/videos/video_y.mp4".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        let loaded = store.get(job.id).await.unwrap();
        assert_eq!(loaded.video_url.as_deref(), Some("/videos/video_x.mp4"));
    }

    #[tokio::test]
    async fn rejected_update_leaves_record_untouched() {
        let store = MemoryJobStore::new();
        let job = store.create(new_job()).await;

        // The transition to processing is legal on its own, but the
        // bundled videoUrl is not; nothing may be applied.
        let result = store
            .update(
                job.id,
                JobUpdate {
                    status: Some(JobStatus::Processing),
                    video_url: Some("/videos/video_x.mp4".to_string()),
                },
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));

        let loaded = store.get(job.id).await.unwrap();
        assert_eq!(loaded.status, JobStatus::Pending);
        assert!(loaded.video_url.is_none());
    }

    #[tokio::test]
    async fn list_returns_most_recent_first_with_limit() {
        let store = MemoryJobStore::new();
        let mut ids = Vec::new();
        for _ in 0..12 {
            ids.push(store.create(new_job()).await.id);
        }

        let listed = store.list(10).await;
        assert_eq!(listed.len(), 10);

        // Newest submission first; the two oldest fall off the end.
        assert_eq!(listed[0].id, ids[11]);
        assert_eq!(listed[9].id, ids[2]);

        let timestamps: Vec<_> = listed.iter().map(|job| job.created_at).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(timestamps, sorted);
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_visible() {
        let store = std::sync::Arc::new(MemoryJobStore::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.create(new_job()).await }));
        }
        for handle in handles {
            let job = handle.await.unwrap();
            assert!(store.get(job.id).await.is_ok());
        }

        assert_eq!(store.list(100).await.len(), 16);
    }
}

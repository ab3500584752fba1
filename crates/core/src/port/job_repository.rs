// Job Repository Port (Interface)

use crate::domain::{Job, JobId, JobStatus};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Job persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Write status, published_at and expires_at only if the stored status is `expected`
    ///
    /// # Errors
    /// - `NotFound` if the job does not exist
    /// - `InvalidState` if the stored status moved on concurrently
    async fn update_status(&self, job: &Job, expected: JobStatus) -> Result<()>;

    /// Whether a category reference resolves
    async fn category_exists(&self, category_id: &str) -> Result<bool>;

    /// Attach skill references (idempotent per skill)
    async fn attach_skills(&self, id: &JobId, skill_ids: &[String]) -> Result<()>;

    /// Attach free-text tags (idempotent per tag)
    async fn attach_tags(&self, id: &JobId, tags: &[String]) -> Result<()>;

    async fn find_skills(&self, id: &JobId) -> Result<Vec<String>>;

    async fn find_tags(&self, id: &JobId) -> Result<Vec<String>>;

    /// Atomic `application_count + 1`
    async fn increment_application_count(&self, id: &JobId) -> Result<()>;

    /// Atomic `application_count - 1`, floored at zero
    async fn decrement_application_count(&self, id: &JobId) -> Result<()>;

    /// Atomic `view_count + 1`
    async fn increment_view_count(&self, id: &JobId) -> Result<()>;

    /// Recompute application_count from live applications, returning the new value
    async fn recount_applications(&self, id: &JobId) -> Result<i64>;

    /// Flip every PUBLISHED job with `expires_at <= now` to EXPIRED (bulk predicate)
    async fn expire_published(&self, now_millis: i64) -> Result<u64>;
}

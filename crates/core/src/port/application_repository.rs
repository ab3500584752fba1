// Application Repository Port (Interface)

use crate::domain::{Application, ApplicationId, ApplicationStatus, CandidateId, JobId};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Insert a new application
    ///
    /// # Errors
    /// - `Conflict` if (job_id, candidate_id) already has an application
    async fn insert(&self, application: &Application) -> Result<()>;

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>>;

    async fn find_by_job_and_candidate(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<Option<Application>>;

    /// Persist status, review and interview fields if the stored status is `expected`
    ///
    /// # Errors
    /// - `NotFound` if the application does not exist
    /// - `InvalidState` if the stored status moved on concurrently
    async fn update_review(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<()>;

    /// Atomic `view_count + 1`
    async fn increment_view_count(&self, id: &ApplicationId) -> Result<()>;

    /// Delete the application if the stored status is still `expected`
    async fn delete(&self, id: &ApplicationId, expected: ApplicationStatus) -> Result<()>;

    /// Count live applications for a job
    async fn count_for_job(&self, job_id: &JobId) -> Result<i64>;
}

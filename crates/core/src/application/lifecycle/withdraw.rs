// Withdraw Use Case

use super::ApplicationLifecycleManager;
use crate::domain::{Application, ApplicationId, CandidateId, NotificationType};
use crate::error::{AppError, Result};
use tracing::info;

impl ApplicationLifecycleManager {
    /// Candidate withdraws a non-terminal application
    ///
    /// The row and its events are deleted; the candidate may apply again.
    pub async fn withdraw(
        &self,
        application_id: &ApplicationId,
        candidate_id: &CandidateId,
    ) -> Result<Application> {
        let application = self.load_application(application_id).await?;

        if &application.candidate_id != candidate_id {
            return Err(AppError::Forbidden(format!(
                "Application {} does not belong to {}",
                application_id, candidate_id
            )));
        }
        if application.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Application {} is {} and can no longer be withdrawn",
                application_id, application.status
            )));
        }

        let job = self.load_job(&application.job_id).await?;

        self.applications
            .delete(application_id, application.status)
            .await?;
        self.jobs.decrement_application_count(&job.id).await?;

        info!(
            application_id = %application_id,
            job_id = %job.id,
            candidate_id = %candidate_id,
            "Application withdrawn"
        );

        self.notify_company(
            &job,
            NotificationType::ApplicationWithdrawn,
            "Application withdrawn",
            &format!("A candidate withdrew their application to \"{}\"", job.title),
            &job.id,
        )
        .await;

        Ok(application)
    }
}

// Submit Use Case

use super::ApplicationLifecycleManager;
use crate::application::event_log::NewEvent;
use crate::domain::{Application, CandidateId, JobId, NotificationType};
use crate::error::{AppError, Result};
use tracing::{info, warn};

const MAX_COVER_LETTER_LEN: usize = 10_000;

impl ApplicationLifecycleManager {
    /// Apply to a PUBLISHED, unexpired job
    ///
    /// # Errors
    /// - `NotFound` if the job does not exist
    /// - `InvalidState` if the job is not accepting applications
    /// - `Conflict` if the candidate already applied (also when raced at insert)
    /// - any error from the APPLIED append; the application is already stored, so a
    ///   retry reports `Conflict`
    ///
    /// A failed count increment is logged and the stored application returned.
    pub async fn submit(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
        cover_letter: Option<String>,
    ) -> Result<Application> {
        let job = self.load_job(job_id).await?;
        let now = self.time_provider.now_millis();

        if !job.accepts_applications(now) {
            return Err(AppError::InvalidState(format!(
                "Job {} is not accepting applications ({})",
                job.id,
                if job.is_past_expiry(now) {
                    "expired"
                } else {
                    job.status.as_str()
                }
            )));
        }

        let cover_letter = cover_letter
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if cover_letter
            .as_ref()
            .is_some_and(|c| c.len() > MAX_COVER_LETTER_LEN)
        {
            return Err(AppError::Validation(format!(
                "Cover letter too long (max {} characters)",
                MAX_COVER_LETTER_LEN
            )));
        }

        if self
            .applications
            .find_by_job_and_candidate(job_id, candidate_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Candidate {} already applied to job {}",
                candidate_id, job_id
            )));
        }

        let mut application =
            Application::new(self.id_provider.generate_id(), now, job_id, candidate_id);
        application.cover_letter = cover_letter;
        application.cv_url = match self.cv_lookup.primary_cv_url(candidate_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    candidate_id = %candidate_id,
                    error = %e,
                    "CV lookup failed, submitting without CV"
                );
                None
            }
        };

        self.applications.insert(&application).await?;
        self.events
            .append(NewEvent::applied(&application.id, candidate_id))
            .await?;
        if let Err(e) = self.jobs.increment_application_count(job_id).await {
            warn!(
                job_id = %job_id,
                application_id = %application.id,
                error = %e,
                "Application count not incremented, recount the job to repair"
            );
        }

        info!(
            application_id = %application.id,
            job_id = %job_id,
            candidate_id = %candidate_id,
            "Application submitted"
        );

        self.notify_company(
            &job,
            NotificationType::NewApplication,
            "New application",
            &format!("A candidate applied to \"{}\"", job.title),
            &application.id,
        )
        .await;

        Ok(application)
    }
}

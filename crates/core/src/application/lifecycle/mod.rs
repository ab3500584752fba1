//! Application lifecycle
//!
//! Submission, employer review transitions, interview scheduling, withdrawal and
//! CV-view accounting. Every state change follows the same order: validate against
//! the stored state and the actor, persist with a compare-and-set on the old status,
//! append the audit event, then dispatch notifications (best effort).
//!
//! Statements are independent: a crash or a failed append between persist and the
//! audit append leaves the application without its event, and the caller sees the
//! error even though the write stuck. `applicationCount` is kept with atomic
//! increments; a failed increment is logged, and the count can be rebuilt with
//! `JobPublishingManager::repair_application_count`.

mod review;
mod submit;
mod view;
mod withdraw;

use crate::application::access::CompanyAccessResolver;
use crate::application::event_log::EventLog;
use crate::application::notification::NotificationDispatcher;
use crate::application::subscription::SubscriptionGate;
use crate::domain::{
    Application, ApplicationEvent, ApplicationId, Job, JobId, NotificationType, UserId,
};
use crate::error::{AppError, Result};
use crate::port::{ApplicationRepository, CvLookup, IdProvider, JobRepository, TimeProvider};
use std::sync::Arc;
use tracing::warn;

/// Who is reading an application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reader {
    Candidate,
    Employer,
}

pub struct ApplicationLifecycleManager {
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    events: Arc<EventLog>,
    access: Arc<CompanyAccessResolver>,
    gate: Arc<SubscriptionGate>,
    cv_lookup: Arc<dyn CvLookup>,
    notifier: NotificationDispatcher,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ApplicationLifecycleManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        events: Arc<EventLog>,
        access: Arc<CompanyAccessResolver>,
        gate: Arc<SubscriptionGate>,
        cv_lookup: Arc<dyn CvLookup>,
        notifier: NotificationDispatcher,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            jobs,
            applications,
            events,
            access,
            gate,
            cv_lookup,
            notifier,
            id_provider,
            time_provider,
        }
    }

    async fn load_application(&self, id: &ApplicationId) -> Result<Application> {
        self.applications
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Application", id))
    }

    async fn load_job(&self, id: &JobId) -> Result<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Job", id))
    }

    /// Application plus its job, after checking the actor may act for the company
    async fn load_for_employer(
        &self,
        application_id: &ApplicationId,
        actor_id: &UserId,
    ) -> Result<(Application, Job)> {
        let application = self.load_application(application_id).await?;
        let job = self.load_job(&application.job_id).await?;
        self.access.authorize(actor_id, &job.company_id).await?;
        Ok((application, job))
    }

    /// The candidate who applied or anyone acting for the hiring company
    async fn authorize_reader(&self, application: &Application, actor_id: &UserId) -> Result<Reader> {
        if &application.candidate_id == actor_id {
            return Ok(Reader::Candidate);
        }
        let job = self.load_job(&application.job_id).await?;
        self.access.authorize(actor_id, &job.company_id).await?;
        Ok(Reader::Employer)
    }

    pub async fn get(&self, application_id: &ApplicationId, actor_id: &UserId) -> Result<Application> {
        let application = self.load_application(application_id).await?;
        self.authorize_reader(&application, actor_id).await?;
        Ok(application)
    }

    /// Audit trail, oldest first; candidates only see candidate-visible events
    pub async fn history(
        &self,
        application_id: &ApplicationId,
        actor_id: &UserId,
    ) -> Result<Vec<ApplicationEvent>> {
        let application = self.load_application(application_id).await?;
        let reader = self.authorize_reader(&application, actor_id).await?;

        let mut events = self.events.history(application_id).await?;
        if reader == Reader::Candidate {
            events.retain(|e| e.visible_to_candidate);
        }
        Ok(events)
    }

    /// Notify the owner and active HR of the job's company
    ///
    /// Recipient lookup failures are logged; the triggering operation has already
    /// committed.
    async fn notify_company(
        &self,
        job: &Job,
        notification_type: NotificationType,
        title: &str,
        body: &str,
        related_entity_id: &str,
    ) {
        match self.access.company_team(&job.company_id).await {
            Ok(team) => self.notifier.notify_many(
                &team,
                notification_type,
                title,
                body,
                Some(related_entity_id),
            ),
            Err(e) => warn!(
                company_id = %job.company_id,
                notification_type = %notification_type,
                error = %e,
                "Could not resolve notification recipients"
            ),
        }
    }
}

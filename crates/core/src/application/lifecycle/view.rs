// CV View Use Case

use super::ApplicationLifecycleManager;
use crate::application::event_log::NewEvent;
use crate::application::notification::NotificationRequest;
use crate::domain::{ApplicationEventType, ApplicationId, NotificationType, UserId};
use crate::error::{AppError, Result};
use tracing::{debug, info};

impl ApplicationLifecycleManager {
    /// Count an employer's first view of an application against the quota
    ///
    /// Returns `false` when this viewer had already viewed it (nothing recorded).
    /// Two concurrent first views by the same viewer may both count.
    ///
    /// The CV_VIEWED event is written before quota is charged, so a failed append
    /// charges nothing. A view that loses the race for the last unit of quota keeps
    /// its event and returns `QuotaExceeded`; later views by that viewer are free.
    pub async fn record_view(
        &self,
        application_id: &ApplicationId,
        viewer_id: &UserId,
    ) -> Result<bool> {
        let (application, job) = self.load_for_employer(application_id, viewer_id).await?;

        if self
            .events
            .has_event(&application.id, ApplicationEventType::CvViewed, viewer_id)
            .await?
        {
            debug!(
                application_id = %application.id,
                viewer_id = %viewer_id,
                "Repeat view, not counted"
            );
            return Ok(false);
        }

        let decision = self.gate.can_view_application(&job.company_id).await?;
        if !decision.allowed {
            return Err(AppError::QuotaExceeded(
                decision
                    .reason
                    .unwrap_or_else(|| "Application view limit reached".to_string()),
            ));
        }
        self.events
            .append(NewEvent::cv_viewed(&application.id, viewer_id))
            .await?;
        self.gate.record_application_view(&job.company_id).await?;
        self.applications.increment_view_count(&application.id).await?;

        info!(
            application_id = %application.id,
            company_id = %job.company_id,
            viewer_id = %viewer_id,
            "Application viewed"
        );

        self.notifier.notify(NotificationRequest {
            user_id: application.candidate_id.clone(),
            notification_type: NotificationType::ApplicationViewed,
            title: "Application viewed".to_string(),
            body: format!("An employer viewed your application for \"{}\"", job.title),
            related_entity_id: Some(application.id.clone()),
        });

        Ok(true)
    }
}

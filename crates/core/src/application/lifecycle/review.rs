// Review Use Cases (status transitions, interview scheduling)

use super::ApplicationLifecycleManager;
use crate::application::event_log::{format_millis, NewEvent};
use crate::application::notification::NotificationRequest;
use crate::domain::{Application, ApplicationId, ApplicationStatus, NotificationType, UserId};
use crate::error::{AppError, Result};
use tracing::info;

fn notification_type_for(status: ApplicationStatus) -> NotificationType {
    match status {
        ApplicationStatus::Shortlisted => NotificationType::ApplicationShortlisted,
        ApplicationStatus::InterviewScheduled => NotificationType::InterviewScheduled,
        ApplicationStatus::Accepted => NotificationType::ApplicationAccepted,
        ApplicationStatus::Rejected => NotificationType::ApplicationRejected,
        ApplicationStatus::Submitted | ApplicationStatus::Reviewing => {
            NotificationType::ApplicationReviewed
        }
    }
}

/// Empty strings clear nothing; they are treated as absent
fn non_blank(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

impl ApplicationLifecycleManager {
    /// Employer-driven status change
    ///
    /// # Errors
    /// - `NotFound` / `Forbidden`
    /// - `Domain(InvalidStatusTransition)` when the graph forbids the move, always
    ///   the case from a terminal status
    /// - `Validation` for an allowed move to INTERVIEW_SCHEDULED (use `schedule_interview`)
    /// - `InvalidState` when the status changed concurrently
    pub async fn transition(
        &self,
        application_id: &ApplicationId,
        actor_id: &UserId,
        target: ApplicationStatus,
        notes: Option<String>,
    ) -> Result<Application> {
        let (mut application, job) = self.load_for_employer(application_id, actor_id).await?;

        let from = application.status;
        from.validate_transition(target)?;

        if target == ApplicationStatus::InterviewScheduled {
            return Err(AppError::Validation(
                "Use schedule_interview to move an application to INTERVIEW_SCHEDULED"
                    .to_string(),
            ));
        }

        let now = self.time_provider.now_millis();
        application.status = target;
        application.reviewed_by = Some(actor_id.clone());
        application.reviewed_at = Some(now);
        if let Some(notes) = non_blank(notes) {
            application.employer_notes = Some(notes);
        }
        application.updated_at = now;

        self.applications.update_review(&application, from).await?;
        self.events
            .append(NewEvent::status_changed(&application.id, actor_id, from, target))
            .await?;

        info!(
            application_id = %application.id,
            from = %from,
            to = %target,
            actor_id = %actor_id,
            "Application status changed"
        );

        self.notifier.notify(NotificationRequest {
            user_id: application.candidate_id.clone(),
            notification_type: notification_type_for(target),
            title: "Application update".to_string(),
            body: format!(
                "Your application for \"{}\" is now {}",
                job.title, target
            ),
            related_entity_id: Some(application.id.clone()),
        });

        Ok(application)
    }

    /// SHORTLISTED -> INTERVIEW_SCHEDULED at a future instant (epoch ms)
    pub async fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        actor_id: &UserId,
        when_millis: i64,
        notes: Option<String>,
    ) -> Result<Application> {
        let (mut application, job) = self.load_for_employer(application_id, actor_id).await?;

        let now = self.time_provider.now_millis();
        if when_millis <= now {
            return Err(AppError::Validation(
                "Interview time must be in the future".to_string(),
            ));
        }

        let from = application.status;
        from.validate_transition(ApplicationStatus::InterviewScheduled)?;

        application.status = ApplicationStatus::InterviewScheduled;
        application.interview_scheduled_at = Some(when_millis);
        application.interview_notes = non_blank(notes);
        application.reviewed_by = Some(actor_id.clone());
        application.reviewed_at = Some(now);
        application.updated_at = now;

        self.applications.update_review(&application, from).await?;
        self.events
            .append(NewEvent::interview_scheduled(
                &application.id,
                actor_id,
                from,
                when_millis,
            ))
            .await?;

        info!(
            application_id = %application.id,
            interview_at = when_millis,
            actor_id = %actor_id,
            "Interview scheduled"
        );

        self.notifier.notify(NotificationRequest {
            user_id: application.candidate_id.clone(),
            notification_type: NotificationType::InterviewScheduled,
            title: "Interview scheduled".to_string(),
            body: format!(
                "Your interview for \"{}\" is scheduled at {}",
                job.title,
                format_millis(when_millis)
            ),
            related_entity_id: Some(application.id.clone()),
        });

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_per_status() {
        assert_eq!(
            notification_type_for(ApplicationStatus::Rejected),
            NotificationType::ApplicationRejected
        );
        assert_eq!(
            notification_type_for(ApplicationStatus::Reviewing),
            NotificationType::ApplicationReviewed
        );
        assert_eq!(
            notification_type_for(ApplicationStatus::Accepted),
            NotificationType::ApplicationAccepted
        );
    }

    #[test]
    fn test_blank_notes_are_absent() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" ok ".to_string())), Some("ok".to_string()));
        assert_eq!(non_blank(None), None);
    }
}

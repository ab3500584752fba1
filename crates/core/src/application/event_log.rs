// Event Log Use Case
// Append-only audit trail for application state changes

use crate::domain::{
    ApplicationEvent, ApplicationEventType, ApplicationId, ApplicationStatus, UserId,
};
use crate::error::Result;
use crate::port::{ApplicationEventRepository, IdProvider, TimeProvider};
use std::sync::Arc;
use tracing::debug;

/// Event to append (id and timestamp are assigned by the log)
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub application_id: ApplicationId,
    pub event_type: ApplicationEventType,
    pub old_status: Option<ApplicationStatus>,
    pub new_status: Option<ApplicationStatus>,
    pub triggered_by: UserId,
    pub description: String,
    pub visible_to_candidate: bool,
}

impl NewEvent {
    pub fn applied(application_id: &ApplicationId, candidate_id: &UserId) -> Self {
        Self {
            application_id: application_id.clone(),
            event_type: ApplicationEventType::Applied,
            old_status: None,
            new_status: Some(ApplicationStatus::Submitted),
            triggered_by: candidate_id.clone(),
            description: "Application submitted".to_string(),
            visible_to_candidate: true,
        }
    }

    pub fn status_changed(
        application_id: &ApplicationId,
        actor_id: &UserId,
        from: ApplicationStatus,
        to: ApplicationStatus,
    ) -> Self {
        Self {
            application_id: application_id.clone(),
            event_type: ApplicationEventType::StatusChanged,
            old_status: Some(from),
            new_status: Some(to),
            triggered_by: actor_id.clone(),
            description: format!("Status changed from {} to {}", from, to),
            visible_to_candidate: true,
        }
    }

    pub fn interview_scheduled(
        application_id: &ApplicationId,
        actor_id: &UserId,
        from: ApplicationStatus,
        when_millis: i64,
    ) -> Self {
        Self {
            application_id: application_id.clone(),
            event_type: ApplicationEventType::InterviewScheduled,
            old_status: Some(from),
            new_status: Some(ApplicationStatus::InterviewScheduled),
            triggered_by: actor_id.clone(),
            description: format!("Interview scheduled at {}", format_millis(when_millis)),
            visible_to_candidate: true,
        }
    }

    /// CV views are employer-side bookkeeping, hidden from the candidate timeline
    pub fn cv_viewed(application_id: &ApplicationId, viewer_id: &UserId) -> Self {
        Self {
            application_id: application_id.clone(),
            event_type: ApplicationEventType::CvViewed,
            old_status: None,
            new_status: None,
            triggered_by: viewer_id.clone(),
            description: "CV viewed".to_string(),
            visible_to_candidate: false,
        }
    }
}

pub(crate) fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

pub struct EventLog {
    events: Arc<dyn ApplicationEventRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl EventLog {
    pub fn new(
        events: Arc<dyn ApplicationEventRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            events,
            id_provider,
            time_provider,
        }
    }

    pub async fn append(&self, new: NewEvent) -> Result<ApplicationEvent> {
        let event = ApplicationEvent {
            id: self.id_provider.generate_id(),
            application_id: new.application_id,
            event_type: new.event_type,
            old_status: new.old_status,
            new_status: new.new_status,
            triggered_by: new.triggered_by,
            description: new.description,
            visible_to_candidate: new.visible_to_candidate,
            created_at: self.time_provider.now_millis(),
        };

        self.events.append(&event).await?;

        debug!(
            application_id = %event.application_id,
            event_type = %event.event_type,
            "Event appended"
        );
        Ok(event)
    }

    /// Events oldest first
    pub async fn history(&self, application_id: &ApplicationId) -> Result<Vec<ApplicationEvent>> {
        self.events.list_for_application(application_id).await
    }

    pub async fn has_event(
        &self,
        application_id: &ApplicationId,
        event_type: ApplicationEventType,
        actor_id: &UserId,
    ) -> Result<bool> {
        self.events.exists(application_id, event_type, actor_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::event_repository::MockApplicationEventRepository;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::time_provider::mocks::MockTimeProvider;

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let mut repo = MockApplicationEventRepository::new();
        repo.expect_append()
            .withf(|e| e.id == "evt-1" && e.created_at == 1_000 && e.old_status.is_none())
            .times(1)
            .returning(|_| Ok(()));

        let log = EventLog::new(
            Arc::new(repo),
            Arc::new(SequentialIdProvider::new("evt")),
            Arc::new(MockTimeProvider::new(1_000)),
        );

        let event = log
            .append(NewEvent::applied(&"app-1".to_string(), &"cand-1".to_string()))
            .await
            .unwrap();

        assert_eq!(event.event_type, ApplicationEventType::Applied);
        assert_eq!(event.new_status, Some(ApplicationStatus::Submitted));
        assert!(event.visible_to_candidate);
    }

    #[test]
    fn test_status_changed_description() {
        let e = NewEvent::status_changed(
            &"app-1".to_string(),
            &"hr-1".to_string(),
            ApplicationStatus::Submitted,
            ApplicationStatus::Shortlisted,
        );
        assert_eq!(e.description, "Status changed from SUBMITTED to SHORTLISTED");
        assert_eq!(e.old_status, Some(ApplicationStatus::Submitted));
    }

    #[test]
    fn test_cv_view_hidden_from_candidate() {
        let e = NewEvent::cv_viewed(&"app-1".to_string(), &"hr-1".to_string());
        assert!(!e.visible_to_candidate);
        assert!(e.new_status.is_none());
    }
}

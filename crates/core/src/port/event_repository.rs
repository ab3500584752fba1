// Application Event Repository Port (append-only)

use crate::domain::{ApplicationEvent, ApplicationEventType, ApplicationId, UserId};
use crate::error::Result;
use async_trait::async_trait;

/// No update or delete: events live exactly as long as their application
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationEventRepository: Send + Sync {
    async fn append(&self, event: &ApplicationEvent) -> Result<()>;

    /// Events for one application, oldest first
    async fn list_for_application(&self, application_id: &ApplicationId)
        -> Result<Vec<ApplicationEvent>>;

    /// Whether `triggered_by` already produced an event of this type
    async fn exists(
        &self,
        application_id: &ApplicationId,
        event_type: ApplicationEventType,
        triggered_by: &UserId,
    ) -> Result<bool>;
}

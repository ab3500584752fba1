// Notification Repository Port

use crate::domain::{Notification, UserId};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<()>;

    /// Notifications for a user, newest first
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>>;
}

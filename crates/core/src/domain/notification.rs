// Notification Domain Model

use super::error::{DomainError, Result};
use super::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type NotificationId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewApplication,
    ApplicationReviewed,
    ApplicationShortlisted,
    InterviewScheduled,
    ApplicationAccepted,
    ApplicationRejected,
    ApplicationViewed,
    ApplicationWithdrawn,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewApplication => "NEW_APPLICATION",
            NotificationType::ApplicationReviewed => "APPLICATION_REVIEWED",
            NotificationType::ApplicationShortlisted => "APPLICATION_SHORTLISTED",
            NotificationType::InterviewScheduled => "INTERVIEW_SCHEDULED",
            NotificationType::ApplicationAccepted => "APPLICATION_ACCEPTED",
            NotificationType::ApplicationRejected => "APPLICATION_REJECTED",
            NotificationType::ApplicationViewed => "APPLICATION_VIEWED",
            NotificationType::ApplicationWithdrawn => "APPLICATION_WITHDRAWN",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NEW_APPLICATION" => Ok(NotificationType::NewApplication),
            "APPLICATION_REVIEWED" => Ok(NotificationType::ApplicationReviewed),
            "APPLICATION_SHORTLISTED" => Ok(NotificationType::ApplicationShortlisted),
            "INTERVIEW_SCHEDULED" => Ok(NotificationType::InterviewScheduled),
            "APPLICATION_ACCEPTED" => Ok(NotificationType::ApplicationAccepted),
            "APPLICATION_REJECTED" => Ok(NotificationType::ApplicationRejected),
            "APPLICATION_VIEWED" => Ok(NotificationType::ApplicationViewed),
            "APPLICATION_WITHDRAWN" => Ok(NotificationType::ApplicationWithdrawn),
            other => Err(DomainError::UnknownVariant {
                kind: "notification type",
                value: other.to_string(),
            }),
        }
    }
}

/// Best-effort message to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub related_entity_id: Option<String>,
    pub is_read: bool,
    pub created_at: i64,
}

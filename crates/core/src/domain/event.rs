// Application Event (append-only audit entry)

use super::application::{ApplicationId, ApplicationStatus};
use super::error::{DomainError, Result};
use super::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type EventId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationEventType {
    Applied,
    StatusChanged,
    InterviewScheduled,
    CvViewed,
}

impl ApplicationEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationEventType::Applied => "APPLIED",
            ApplicationEventType::StatusChanged => "STATUS_CHANGED",
            ApplicationEventType::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationEventType::CvViewed => "CV_VIEWED",
        }
    }
}

impl std::fmt::Display for ApplicationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationEventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "APPLIED" => Ok(ApplicationEventType::Applied),
            "STATUS_CHANGED" => Ok(ApplicationEventType::StatusChanged),
            "INTERVIEW_SCHEDULED" => Ok(ApplicationEventType::InterviewScheduled),
            "CV_VIEWED" => Ok(ApplicationEventType::CvViewed),
            other => Err(DomainError::UnknownVariant {
                kind: "application event type",
                value: other.to_string(),
            }),
        }
    }
}

/// Immutable audit row for one transition of an Application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationEvent {
    pub id: EventId,
    pub application_id: ApplicationId,
    pub event_type: ApplicationEventType,
    pub old_status: Option<ApplicationStatus>,
    pub new_status: Option<ApplicationStatus>,
    pub triggered_by: UserId,
    pub description: String,
    pub visible_to_candidate: bool,
    pub created_at: i64, // epoch ms
}

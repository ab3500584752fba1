// Application Domain Model

use super::error::{DomainError, Result};
use super::job::JobId;
use super::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Application ID (UUID v4)
pub type ApplicationId = String;

/// Job-seeker profile identifier (also the user notified about the application)
pub type CandidateId = String;

/// Application status
///
/// ```text
/// SUBMITTED -> REVIEWING -> SHORTLISTED -> INTERVIEW_SCHEDULED -> ACCEPTED
///     |            |             |                  |
///     +------------+-------------+------------------+--> REJECTED
/// ```
///
/// SUBMITTED may skip straight to SHORTLISTED. ACCEPTED and REJECTED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Submitted,
    Reviewing,
    Shortlisted,
    InterviewScheduled,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::Shortlisted => "SHORTLISTED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        if self.is_terminal() {
            return false;
        }
        match target {
            Rejected => true,
            Submitted => false,
            Reviewing => *self == Submitted,
            Shortlisted => matches!(self, Submitted | Reviewing),
            InterviewScheduled => *self == Shortlisted,
            Accepted => *self == InterviewScheduled,
        }
    }

    pub fn validate_transition(&self, target: ApplicationStatus) -> Result<()> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SUBMITTED" => Ok(ApplicationStatus::Submitted),
            "REVIEWING" => Ok(ApplicationStatus::Reviewing),
            "SHORTLISTED" => Ok(ApplicationStatus::Shortlisted),
            "INTERVIEW_SCHEDULED" => Ok(ApplicationStatus::InterviewScheduled),
            "ACCEPTED" => Ok(ApplicationStatus::Accepted),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            other => Err(DomainError::UnknownVariant {
                kind: "application status",
                value: other.to_string(),
            }),
        }
    }
}

/// One candidate's submission to one Job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub status: ApplicationStatus,

    pub cover_letter: Option<String>,
    pub cv_url: Option<String>,

    // Review
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<i64>,
    pub employer_notes: Option<String>,

    // Interview
    pub interview_scheduled_at: Option<i64>,
    pub interview_notes: Option<String>,

    pub view_count: i64,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Application {
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        job_id: impl Into<String>,
        candidate_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            job_id: job_id.into(),
            candidate_id: candidate_id.into(),
            status: ApplicationStatus::Submitted,
            cover_letter: None,
            cv_url: None,
            reviewed_by: None,
            reviewed_at: None,
            employer_notes: None,
            interview_scheduled_at: None,
            interview_notes: None,
            view_count: 0,
            created_at,
            updated_at: created_at,
        }
    }
}

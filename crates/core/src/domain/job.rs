// Job Posting Domain Model

use super::company::CompanyId;
use super::error::{DomainError, Result};
use super::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Job ID (UUID v4)
pub type JobId = String;

/// Job posting status
///
/// DRAFT -> PUBLISHED -> {CLOSED, EXPIRED}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Expired,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::Published => "PUBLISHED",
            JobStatus::Closed => "CLOSED",
            JobStatus::Expired => "EXPIRED",
        }
    }

    pub fn can_transition_to(&self, target: JobStatus) -> bool {
        matches!(
            (self, target),
            (JobStatus::Draft, JobStatus::Published)
                | (JobStatus::Published, JobStatus::Closed)
                | (JobStatus::Published, JobStatus::Expired)
        )
    }

    /// Validate a status change against the posting graph
    pub fn validate_transition(&self, target: JobStatus) -> Result<()> {
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

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DRAFT" => Ok(JobStatus::Draft),
            "PUBLISHED" => Ok(JobStatus::Published),
            "CLOSED" => Ok(JobStatus::Closed),
            "EXPIRED" => Ok(JobStatus::Expired),
            other => Err(DomainError::UnknownVariant {
                kind: "job status",
                value: other.to_string(),
            }),
        }
    }
}

/// Job posting owned by a Company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub status: JobStatus,

    // Shared counters (maintained by atomic SQL increments)
    pub view_count: i64,
    pub application_count: i64,

    pub created_by: UserId,
    pub created_at: i64, // epoch ms
    pub published_at: Option<i64>,
    pub expires_at: Option<i64>,
}

impl Job {
    /// Create a new DRAFT job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        company_id: impl Into<String>,
        created_by: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            title: title.into(),
            description: description.into(),
            category_id: None,
            status: JobStatus::Draft,
            view_count: 0,
            application_count: 0,
            created_by: created_by.into(),
            created_at,
            published_at: None,
            expires_at: None,
        }
    }

    /// Whether candidates may apply at `now_millis`
    pub fn accepts_applications(&self, now_millis: i64) -> bool {
        self.status == JobStatus::Published && !self.is_past_expiry(now_millis)
    }

    pub fn is_past_expiry(&self, now_millis: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_millis)
    }
}

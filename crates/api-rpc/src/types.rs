//! RPC Request/Response Types
//!
//! Every request carries the caller's `actor_id`. Timestamps are epoch ms.

use recruit_core::application::JobSpec;
use recruit_core::domain::{ApplicationEvent, ApplicationStatus, PlanType};
use serde::{Deserialize, Serialize};

/// application.submit.v1 - Apply to a published job
#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub actor_id: String,
    pub job_id: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

/// application.get.v1 / application.history.v1 / application.withdraw.v1 /
/// application.view.v1
#[derive(Debug, Deserialize)]
pub struct ApplicationRequest {
    pub actor_id: String,
    pub application_id: String,
}

/// application.status.v1 - Employer status change
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub actor_id: String,
    pub application_id: String,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// application.schedule_interview.v1
#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub actor_id: String,
    pub application_id: String,
    pub scheduled_at: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub application_id: String,
    pub events: Vec<ApplicationEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawResponse {
    pub application_id: String,
    pub job_id: String,
    pub withdrawn: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub application_id: String,
    /// False when the viewer had already viewed this application
    pub counted: bool,
}

/// job.create.v1
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub actor_id: String,
    pub company_id: String,
    #[serde(flatten)]
    pub job: JobSpec,
}

/// job.publish.v1 / job.close.v1 / job.recount_applications.v1
#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub actor_id: String,
    pub job_id: String,
}

/// job.get.v1 / job.view.v1 - public, no actor required
#[derive(Debug, Deserialize)]
pub struct PublicJobRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobViewResponse {
    pub job_id: String,
    pub recorded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecountResponse {
    pub job_id: String,
    pub application_count: i64,
}

/// subscription.quota.v1 / subscription.cancel.v1 / subscription.history.v1
#[derive(Debug, Deserialize)]
pub struct CompanyRequest {
    pub actor_id: String,
    pub company_id: String,
}

/// subscription.upgrade.v1
#[derive(Debug, Deserialize)]
pub struct UpgradeRequest {
    pub actor_id: String,
    pub company_id: String,
    pub plan_type: PlanType,
}

/// subscription.activate.v1
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub actor_id: String,
    pub subscription_id: String,
}

/// admin.sweep_expired.v1
#[derive(Debug, Deserialize)]
pub struct SweepRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub expired: u64,
}

// Job Publishing Use Cases
// create / publish / close / sweep, gated by the subscription quota

pub mod sweeper;

pub use sweeper::ExpirySweeper;

use crate::application::access::CompanyAccessResolver;
use crate::application::subscription::SubscriptionGate;
use crate::domain::{CompanyId, Job, JobId, JobStatus, UserId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;
const MAX_TITLE_LEN: usize = 200;

/// Job creation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSpec {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category_id: Option<String>,

    #[serde(default)]
    pub skill_ids: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Epoch ms; defaults to publish time + `default_job_ttl_days`
    #[serde(default)]
    pub expires_at: Option<i64>,

    /// Publish immediately instead of staging a DRAFT
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingPolicy {
    pub default_job_ttl_days: i64,
}

impl Default for PublishingPolicy {
    fn default() -> Self {
        Self {
            default_job_ttl_days: 30,
        }
    }
}

/// Job with its attached skill and tag references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub skill_ids: Vec<String>,
    pub tags: Vec<String>,
}

fn validate_spec(spec: &JobSpec, now: i64) -> Result<()> {
    let title = spec.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Job title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Job title too long (max {} characters)",
            MAX_TITLE_LEN
        )));
    }
    if let Some(expires_at) = spec.expires_at {
        if expires_at <= now {
            return Err(AppError::Validation(
                "Job expiry must be in the future".to_string(),
            ));
        }
    }
    Ok(())
}

/// Trimmed, non-empty, first occurrence wins
fn normalize_refs(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        let v = v.trim();
        if !v.is_empty() && !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

pub struct JobPublishingManager {
    jobs: Arc<dyn JobRepository>,
    access: Arc<CompanyAccessResolver>,
    gate: Arc<SubscriptionGate>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    policy: PublishingPolicy,
}

impl JobPublishingManager {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        access: Arc<CompanyAccessResolver>,
        gate: Arc<SubscriptionGate>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        policy: PublishingPolicy,
    ) -> Self {
        Self {
            jobs,
            access,
            gate,
            id_provider,
            time_provider,
            policy,
        }
    }

    fn default_expiry(&self, published_at: i64) -> i64 {
        published_at + self.policy.default_job_ttl_days * DAY_MILLIS
    }

    async fn load(&self, job_id: &JobId) -> Result<Job> {
        self.jobs
            .find_by_id(job_id)
            .await?
            .ok_or_else(|| AppError::not_found("Job", job_id))
    }

    /// Create a job as DRAFT, or PUBLISHED when `spec.publish` is set
    ///
    /// The quota is consulted even for drafts; it is only consumed on publish.
    pub async fn create(
        &self,
        company_id: &CompanyId,
        actor_id: &UserId,
        spec: JobSpec,
    ) -> Result<Job> {
        self.access.authorize(actor_id, company_id).await?;

        let now = self.time_provider.now_millis();
        validate_spec(&spec, now)?;

        if let Some(category_id) = &spec.category_id {
            if !self.jobs.category_exists(category_id).await? {
                return Err(AppError::not_found("Category", category_id));
            }
        }

        let decision = self.gate.can_publish(company_id).await?;
        if !decision.allowed {
            return Err(AppError::QuotaExceeded(
                decision
                    .reason
                    .unwrap_or_else(|| "Job limit reached".to_string()),
            ));
        }

        let mut job = Job::new(
            self.id_provider.generate_id(),
            now,
            company_id.clone(),
            actor_id.clone(),
            spec.title.trim(),
            spec.description,
        );
        job.category_id = spec.category_id;
        job.expires_at = spec.expires_at;
        if spec.publish {
            job.status = JobStatus::Published;
            job.published_at = Some(now);
            job.expires_at = Some(spec.expires_at.unwrap_or(self.default_expiry(now)));
        }

        self.jobs.insert(&job).await?;
        self.jobs
            .attach_skills(&job.id, &normalize_refs(&spec.skill_ids))
            .await?;
        self.jobs.attach_tags(&job.id, &normalize_refs(&spec.tags)).await?;

        if job.status == JobStatus::Published {
            if let Err(e) = self.gate.record_publish(company_id).await {
                self.revert_to_draft(&mut job, spec.expires_at).await?;
                return Err(e);
            }
        }

        info!(
            job_id = %job.id,
            company_id = %company_id,
            status = %job.status,
            "Job created"
        );
        Ok(job)
    }

    /// DRAFT -> PUBLISHED, consuming one unit of quota
    pub async fn publish(&self, job_id: &JobId, actor_id: &UserId) -> Result<Job> {
        let mut job = self.load(job_id).await?;
        self.access.authorize(actor_id, &job.company_id).await?;

        if job.status != JobStatus::Draft {
            return Err(AppError::InvalidState(format!(
                "Job {} is {}, only DRAFT jobs can be published",
                job.id, job.status
            )));
        }

        let now = self.time_provider.now_millis();
        if job.is_past_expiry(now) {
            return Err(AppError::Validation(
                "Job expiry must be in the future".to_string(),
            ));
        }

        let decision = self.gate.can_publish(&job.company_id).await?;
        if !decision.allowed {
            return Err(AppError::QuotaExceeded(
                decision
                    .reason
                    .unwrap_or_else(|| "Job limit reached".to_string()),
            ));
        }

        let staged_expiry = job.expires_at;
        job.status = JobStatus::Published;
        job.published_at = Some(now);
        job.expires_at = Some(staged_expiry.unwrap_or(self.default_expiry(now)));
        self.jobs.update_status(&job, JobStatus::Draft).await?;

        if let Err(e) = self.gate.record_publish(&job.company_id).await {
            self.revert_to_draft(&mut job, staged_expiry).await?;
            return Err(e);
        }

        info!(job_id = %job.id, company_id = %job.company_id, "Job published");
        Ok(job)
    }

    async fn revert_to_draft(&self, job: &mut Job, staged_expiry: Option<i64>) -> Result<()> {
        warn!(job_id = %job.id, "Publish lost the quota race, reverting to DRAFT");
        job.status = JobStatus::Draft;
        job.published_at = None;
        job.expires_at = staged_expiry;
        self.jobs.update_status(job, JobStatus::Published).await
    }

    /// PUBLISHED -> CLOSED (quota is not refunded)
    pub async fn close(&self, job_id: &JobId, actor_id: &UserId) -> Result<Job> {
        let mut job = self.load(job_id).await?;
        self.access.authorize(actor_id, &job.company_id).await?;

        if job.status != JobStatus::Published {
            return Err(AppError::InvalidState(format!(
                "Job {} is {}, only PUBLISHED jobs can be closed",
                job.id, job.status
            )));
        }

        job.status = JobStatus::Closed;
        self.jobs.update_status(&job, JobStatus::Published).await?;

        info!(job_id = %job.id, company_id = %job.company_id, "Job closed");
        Ok(job)
    }

    /// Flip every PUBLISHED job past its expiry to EXPIRED
    pub async fn sweep_expired(&self) -> Result<u64> {
        let now = self.time_provider.now_millis();
        let expired = self.jobs.expire_published(now).await?;
        if expired > 0 {
            info!(expired, "Expired jobs swept");
        }
        Ok(expired)
    }

    /// Count a public view of a PUBLISHED job
    pub async fn record_job_view(&self, job_id: &JobId) -> Result<()> {
        let job = self.load(job_id).await?;
        if job.status != JobStatus::Published {
            return Err(AppError::InvalidState(format!(
                "Job {} is {}",
                job.id, job.status
            )));
        }
        self.jobs.increment_view_count(job_id).await
    }

    pub async fn get(&self, job_id: &JobId) -> Result<JobDetails> {
        let job = self.load(job_id).await?;
        let skill_ids = self.jobs.find_skills(job_id).await?;
        let tags = self.jobs.find_tags(job_id).await?;
        Ok(JobDetails {
            job,
            skill_ids,
            tags,
        })
    }

    /// Recompute `application_count` from live applications
    pub async fn repair_application_count(&self, job_id: &JobId, actor_id: &UserId) -> Result<i64> {
        let job = self.load(job_id).await?;
        self.access.authorize(actor_id, &job.company_id).await?;

        let count = self.jobs.recount_applications(job_id).await?;
        if count != job.application_count {
            warn!(
                job_id = %job_id,
                stored = job.application_count,
                actual = count,
                "Application count drift repaired"
            );
        }
        Ok(count)
    }
}

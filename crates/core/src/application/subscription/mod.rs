// Subscription Gate
// Quota checks for publishing jobs and viewing applications

pub mod lifecycle;

pub use lifecycle::{QuotaStatus, SubscriptionManager};

use crate::domain::{
    CompanyId, PlanType, Subscription, SubscriptionPlan, SubscriptionStatus,
};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, PlanRepository, SubscriptionRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Limits used to seed the FREE plan row when it is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreePlanDefaults {
    pub max_jobs: i64,
    pub max_applications: i64,
}

impl Default for FreePlanDefaults {
    fn default() -> Self {
        Self {
            max_jobs: 3,
            max_applications: 50,
        }
    }
}

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub subscription: Subscription,
    pub plan: SubscriptionPlan,
}

pub struct SubscriptionGate {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
    free_plan: FreePlanDefaults,
}

impl SubscriptionGate {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        free_plan: FreePlanDefaults,
    ) -> Self {
        Self {
            plans,
            subscriptions,
            id_provider,
            time_provider,
            free_plan,
        }
    }

    /// The FREE plan row, seeded from [`FreePlanDefaults`] on first use
    pub async fn free_plan(&self) -> Result<SubscriptionPlan> {
        if let Some(plan) = self.plans.find_by_type(PlanType::Free).await? {
            return Ok(plan);
        }

        let plan = SubscriptionPlan {
            id: self.id_provider.generate_id(),
            plan_type: PlanType::Free,
            max_jobs: self.free_plan.max_jobs,
            max_applications: self.free_plan.max_applications,
            price_cents: 0,
            duration_days: None,
        };

        match self.plans.insert(&plan).await {
            Ok(()) => {
                info!(
                    plan_id = %plan.id,
                    max_jobs = plan.max_jobs,
                    max_applications = plan.max_applications,
                    "FREE plan seeded"
                );
                Ok(plan)
            }
            // Seeded concurrently
            Err(AppError::Conflict(_)) => self
                .plans
                .find_by_type(PlanType::Free)
                .await?
                .ok_or_else(|| AppError::Internal("FREE plan vanished after conflict".into())),
            Err(e) => Err(e),
        }
    }

    /// ACTIVE subscription and its plan, auto-provisioning FREE when none exists
    pub async fn active_subscription(
        &self,
        company_id: &CompanyId,
    ) -> Result<(Subscription, SubscriptionPlan)> {
        let subscription = match self.subscriptions.find_active(company_id).await? {
            Some(subscription) => subscription,
            None => self.provision_free(company_id).await?,
        };

        let plan = self
            .plans
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Subscription {} references missing plan {}",
                    subscription.id, subscription.plan_id
                ))
            })?;

        Ok((subscription, plan))
    }

    /// A fresh FREE subscription; usage of the company's last FREE period carries over
    async fn provision_free(&self, company_id: &CompanyId) -> Result<Subscription> {
        let plan = self.free_plan().await?;
        let history = self.subscriptions.list_for_company(company_id).await?;
        let (jobs_posted, applications_viewed) = history
            .iter()
            .rev()
            .find(|previous| previous.plan_id == plan.id)
            .map_or((0, 0), |previous| {
                (previous.jobs_posted, previous.applications_viewed)
            });

        let subscription = Subscription {
            id: self.id_provider.generate_id(),
            company_id: company_id.clone(),
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            jobs_posted,
            applications_viewed,
            start_date: self.time_provider.now_millis(),
            end_date: None,
        };

        match self.subscriptions.insert(&subscription).await {
            Ok(()) => {
                info!(
                    company_id = %company_id,
                    subscription_id = %subscription.id,
                    jobs_posted,
                    applications_viewed,
                    "FREE subscription provisioned"
                );
                Ok(subscription)
            }
            Err(AppError::Conflict(_)) => {
                // Another request provisioned first
                self.subscriptions
                    .find_active(company_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "No ACTIVE subscription for company {} after conflict",
                            company_id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }

    pub async fn can_publish(&self, company_id: &CompanyId) -> Result<QuotaDecision> {
        let (subscription, plan) = self.active_subscription(company_id).await?;
        let allowed = subscription.jobs_posted < plan.max_jobs;
        let reason = (!allowed).then(|| {
            format!(
                "Job limit reached for {} plan ({}/{})",
                plan.plan_type, subscription.jobs_posted, plan.max_jobs
            )
        });
        Ok(QuotaDecision {
            allowed,
            reason,
            subscription,
            plan,
        })
    }

    /// Count one publish against the ACTIVE subscription
    ///
    /// # Errors
    /// - `QuotaExceeded` if the ceiling was reached, including by a concurrent publish
    pub async fn record_publish(&self, company_id: &CompanyId) -> Result<()> {
        let (subscription, plan) = self.active_subscription(company_id).await?;
        if self
            .subscriptions
            .try_increment_jobs_posted(&subscription.id, plan.max_jobs)
            .await?
        {
            return Ok(());
        }

        warn!(
            company_id = %company_id,
            subscription_id = %subscription.id,
            max_jobs = plan.max_jobs,
            "Publish quota exhausted at record time"
        );
        Err(AppError::QuotaExceeded(format!(
            "Job limit reached for {} plan ({} jobs)",
            plan.plan_type, plan.max_jobs
        )))
    }

    pub async fn can_view_application(&self, company_id: &CompanyId) -> Result<QuotaDecision> {
        let (subscription, plan) = self.active_subscription(company_id).await?;
        let allowed = subscription.applications_viewed < plan.max_applications;
        let reason = (!allowed).then(|| {
            format!(
                "Application view limit reached for {} plan ({}/{})",
                plan.plan_type, subscription.applications_viewed, plan.max_applications
            )
        });
        Ok(QuotaDecision {
            allowed,
            reason,
            subscription,
            plan,
        })
    }

    pub async fn record_application_view(&self, company_id: &CompanyId) -> Result<()> {
        let (subscription, plan) = self.active_subscription(company_id).await?;
        if self
            .subscriptions
            .try_increment_applications_viewed(&subscription.id, plan.max_applications)
            .await?
        {
            return Ok(());
        }

        Err(AppError::QuotaExceeded(format!(
            "Application view limit reached for {} plan ({} views)",
            plan.plan_type, plan.max_applications
        )))
    }
}

// Subscription & Plan Repository Ports

use crate::domain::{
    CompanyId, PlanId, PlanType, Subscription, SubscriptionId, SubscriptionPlan,
    SubscriptionStatus,
};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn insert(&self, plan: &SubscriptionPlan) -> Result<()>;

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<SubscriptionPlan>>;

    async fn find_by_type(&self, plan_type: PlanType) -> Result<Option<SubscriptionPlan>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a new subscription
    ///
    /// # Errors
    /// - `Conflict` if an ACTIVE subscription already exists for the company
    async fn insert(&self, subscription: &Subscription) -> Result<()>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>>;

    /// The single ACTIVE subscription of a company, if any
    async fn find_active(&self, company_id: &CompanyId) -> Result<Option<Subscription>>;

    /// Every subscription of a company, oldest first (audit trail)
    async fn list_for_company(&self, company_id: &CompanyId) -> Result<Vec<Subscription>>;

    /// Compare-and-set the status, stamping `end_date` when given
    async fn update_status(
        &self,
        id: &SubscriptionId,
        expected: SubscriptionStatus,
        status: SubscriptionStatus,
        end_date: Option<i64>,
    ) -> Result<()>;

    /// Atomic `jobs_posted + 1` only while `jobs_posted < max_jobs`
    ///
    /// Returns false when the ceiling was already reached.
    async fn try_increment_jobs_posted(&self, id: &SubscriptionId, max_jobs: i64)
        -> Result<bool>;

    /// Atomic `applications_viewed + 1` only while below `max_applications`
    async fn try_increment_applications_viewed(
        &self,
        id: &SubscriptionId,
        max_applications: i64,
    ) -> Result<bool>;
}

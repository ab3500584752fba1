// Subscription lifecycle: upgrade (PENDING), activate (supersedes), cancel

use super::SubscriptionGate;
use crate::application::access::CompanyAccessResolver;
use crate::domain::{
    CompanyId, PlanType, Subscription, SubscriptionId, SubscriptionPlan, SubscriptionStatus,
    UserId,
};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, PlanRepository, SubscriptionRepository, TimeProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Current usage against the ACTIVE plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotaStatus {
    pub subscription: Subscription,
    pub plan: SubscriptionPlan,
    pub jobs_remaining: i64,
    pub applications_remaining: i64,
}

pub struct SubscriptionManager {
    access: Arc<CompanyAccessResolver>,
    gate: Arc<SubscriptionGate>,
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl SubscriptionManager {
    pub fn new(
        access: Arc<CompanyAccessResolver>,
        gate: Arc<SubscriptionGate>,
        plans: Arc<dyn PlanRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            access,
            gate,
            plans,
            subscriptions,
            id_provider,
            time_provider,
        }
    }

    pub async fn quota_status(&self, company_id: &CompanyId, actor_id: &UserId) -> Result<QuotaStatus> {
        self.access.authorize(actor_id, company_id).await?;
        let (subscription, plan) = self.gate.active_subscription(company_id).await?;
        Ok(QuotaStatus {
            jobs_remaining: (plan.max_jobs - subscription.jobs_posted).max(0),
            applications_remaining: (plan.max_applications - subscription.applications_viewed)
                .max(0),
            subscription,
            plan,
        })
    }

    /// Request a paid plan; the new subscription stays PENDING until activated
    pub async fn upgrade(
        &self,
        company_id: &CompanyId,
        actor_id: &UserId,
        plan_type: PlanType,
    ) -> Result<Subscription> {
        self.access.authorize(actor_id, company_id).await?;

        if plan_type == PlanType::Free {
            return Err(AppError::Validation(
                "FREE plan is provisioned automatically".to_string(),
            ));
        }

        let plan = self
            .plans
            .find_by_type(plan_type)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} plan not found", plan_type)))?;

        let subscription = Subscription {
            id: self.id_provider.generate_id(),
            company_id: company_id.clone(),
            plan_id: plan.id,
            status: SubscriptionStatus::Pending,
            jobs_posted: 0,
            applications_viewed: 0,
            start_date: self.time_provider.now_millis(),
            end_date: None,
        };
        self.subscriptions.insert(&subscription).await?;

        info!(
            company_id = %company_id,
            subscription_id = %subscription.id,
            plan_type = %plan_type,
            "Upgrade requested"
        );
        Ok(subscription)
    }

    /// PENDING -> ACTIVE, cancelling whichever subscription it supersedes
    pub async fn activate(
        &self,
        subscription_id: &SubscriptionId,
        actor_id: &UserId,
    ) -> Result<Subscription> {
        let mut subscription = self
            .subscriptions
            .find_by_id(subscription_id)
            .await?
            .ok_or_else(|| AppError::not_found("Subscription", subscription_id))?;
        self.access
            .authorize(actor_id, &subscription.company_id)
            .await?;

        if let Err(e) = subscription
            .status
            .validate_transition(SubscriptionStatus::Active)
        {
            return Err(AppError::InvalidState(e.to_string()));
        }

        let plan = self
            .plans
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan", &subscription.plan_id))?;

        let now = self.time_provider.now_millis();
        if let Some(current) = self
            .subscriptions
            .find_active(&subscription.company_id)
            .await?
        {
            self.subscriptions
                .update_status(
                    &current.id,
                    SubscriptionStatus::Active,
                    SubscriptionStatus::Cancelled,
                    Some(now),
                )
                .await?;
            info!(
                company_id = %current.company_id,
                subscription_id = %current.id,
                superseded_by = %subscription.id,
                "Subscription superseded"
            );
        }

        let end_date = plan.duration_days.map(|days| now + days * DAY_MILLIS);
        self.subscriptions
            .update_status(
                &subscription.id,
                SubscriptionStatus::Pending,
                SubscriptionStatus::Active,
                end_date,
            )
            .await?;

        subscription.status = SubscriptionStatus::Active;
        subscription.end_date = end_date;

        info!(
            company_id = %subscription.company_id,
            subscription_id = %subscription.id,
            plan_type = %plan.plan_type,
            "Subscription activated"
        );
        Ok(subscription)
    }

    /// ACTIVE -> CANCELLED; the company falls back to FREE on its next gate call,
    /// resuming the usage of its last FREE subscription
    ///
    /// Cancelling FREE itself is refused.
    pub async fn cancel(&self, company_id: &CompanyId, actor_id: &UserId) -> Result<Subscription> {
        self.access.authorize(actor_id, company_id).await?;

        let mut subscription = self
            .subscriptions
            .find_active(company_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No active subscription for company {}", company_id))
            })?;

        let plan = self
            .plans
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| AppError::not_found("Plan", &subscription.plan_id))?;
        if plan.plan_type == PlanType::Free {
            return Err(AppError::InvalidState(
                "FREE subscription cannot be cancelled".to_string(),
            ));
        }

        let now = self.time_provider.now_millis();
        self.subscriptions
            .update_status(
                &subscription.id,
                SubscriptionStatus::Active,
                SubscriptionStatus::Cancelled,
                Some(now),
            )
            .await?;

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.end_date = Some(now);

        info!(
            company_id = %company_id,
            subscription_id = %subscription.id,
            "Subscription cancelled"
        );
        Ok(subscription)
    }

    /// Every subscription of a company, oldest first
    pub async fn history(&self, company_id: &CompanyId, actor_id: &UserId) -> Result<Vec<Subscription>> {
        self.access.authorize(actor_id, company_id).await?;
        self.subscriptions.list_for_company(company_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::subscription::FreePlanDefaults;
    use crate::port::company_repository::{MockCompanyRepository, MockHrAssignmentRepository};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::subscription_repository::{MockPlanRepository, MockSubscriptionRepository};
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn owner_access() -> Arc<CompanyAccessResolver> {
        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_owned_by()
            .returning(|_| Ok(vec!["c-1".to_string()]));
        let mut hr = MockHrAssignmentRepository::new();
        hr.expect_active_company_ids_for().returning(|_| Ok(vec![]));
        Arc::new(CompanyAccessResolver::new(Arc::new(companies), Arc::new(hr)))
    }

    fn manager(plans: MockPlanRepository, subs: MockSubscriptionRepository) -> SubscriptionManager {
        let plans: Arc<dyn PlanRepository> = Arc::new(plans);
        let subs: Arc<dyn SubscriptionRepository> = Arc::new(subs);
        let ids: Arc<dyn IdProvider> = Arc::new(SequentialIdProvider::new("sub"));
        let clock: Arc<dyn TimeProvider> = Arc::new(MockTimeProvider::new(10_000));
        let gate = Arc::new(SubscriptionGate::new(
            plans.clone(),
            subs.clone(),
            ids.clone(),
            clock.clone(),
            FreePlanDefaults::default(),
        ));
        SubscriptionManager::new(owner_access(), gate, plans, subs, ids, clock)
    }

    fn plan(id: &str, plan_type: PlanType, duration_days: Option<i64>) -> SubscriptionPlan {
        SubscriptionPlan {
            id: id.to_string(),
            plan_type,
            max_jobs: 10,
            max_applications: 500,
            price_cents: 4_900,
            duration_days,
        }
    }

    fn subscription(id: &str, plan_id: &str, status: SubscriptionStatus) -> Subscription {
        Subscription {
            id: id.to_string(),
            company_id: "c-1".to_string(),
            plan_id: plan_id.to_string(),
            status,
            jobs_posted: 0,
            applications_viewed: 0,
            start_date: 0,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_upgrade_to_free_is_rejected() {
        let err = manager(MockPlanRepository::new(), MockSubscriptionRepository::new())
            .upgrade(&"c-1".to_string(), &"owner".to_string(), PlanType::Free)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upgrade_creates_pending() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_find_by_type()
            .returning(|t| Ok(Some(plan("plan-basic", t, Some(30)))));
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_insert()
            .withf(|s| s.status == SubscriptionStatus::Pending && s.plan_id == "plan-basic")
            .times(1)
            .returning(|_| Ok(()));

        let sub = manager(plans, subs)
            .upgrade(&"c-1".to_string(), &"owner".to_string(), PlanType::Basic)
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Pending);
    }

    #[tokio::test]
    async fn test_activate_supersedes_current() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_find_by_id()
            .returning(|id| Ok(Some(plan(id, PlanType::Basic, Some(30)))));
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_find_by_id()
            .returning(|_| Ok(Some(subscription("sub-new", "plan-basic", SubscriptionStatus::Pending))));
        subs.expect_find_active()
            .returning(|_| Ok(Some(subscription("sub-old", "plan-free", SubscriptionStatus::Active))));
        subs.expect_update_status()
            .withf(|id, expected, status, end| {
                id == "sub-old"
                    && *expected == SubscriptionStatus::Active
                    && *status == SubscriptionStatus::Cancelled
                    && *end == Some(10_000)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        subs.expect_update_status()
            .withf(|id, _, status, end| {
                id == "sub-new"
                    && *status == SubscriptionStatus::Active
                    && *end == Some(10_000 + 30 * DAY_MILLIS)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let sub = manager(plans, subs)
            .activate(&"sub-new".to_string(), &"owner".to_string())
            .await
            .unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn test_activate_cancelled_is_invalid_state() {
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_find_by_id()
            .returning(|_| Ok(Some(subscription("sub-1", "plan-basic", SubscriptionStatus::Cancelled))));

        let err = manager(MockPlanRepository::new(), subs)
            .activate(&"sub-1".to_string(), &"owner".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_cancel_free_is_refused() {
        let mut plans = MockPlanRepository::new();
        plans
            .expect_find_by_id()
            .returning(|id| Ok(Some(plan(id, PlanType::Free, None))));
        let mut subs = MockSubscriptionRepository::new();
        subs.expect_find_active()
            .returning(|_| Ok(Some(subscription("sub-1", "plan-free", SubscriptionStatus::Active))));

        let err = manager(plans, subs)
            .cancel(&"c-1".to_string(), &"owner".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }
}

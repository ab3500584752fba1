// SQLite Plan & Subscription repositories

use crate::error::{cas_failure, map_sqlx_error};
use async_trait::async_trait;
use recruit_core::domain::{
    CompanyId, PlanId, PlanType, Subscription, SubscriptionId, SubscriptionPlan,
    SubscriptionStatus,
};
use recruit_core::error::{AppError, Result};
use recruit_core::port::{PlanRepository, SubscriptionRepository};
use sqlx::SqlitePool;

/// Implements both [`PlanRepository`] and [`SubscriptionRepository`]
pub struct SqliteSubscriptionRepository {
    pool: SqlitePool,
}

impl SqliteSubscriptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for SqliteSubscriptionRepository {
    async fn insert(&self, plan: &SubscriptionPlan) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscription_plans (
                id, plan_type, max_jobs, max_applications, price_cents, duration_days
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&plan.id)
        .bind(plan.plan_type.as_str())
        .bind(plan.max_jobs)
        .bind(plan.max_applications)
        .bind(plan.price_cents)
        .bind(plan.duration_days)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<SubscriptionPlan>> {
        let row = sqlx::query_as::<_, PlanRow>("SELECT * FROM subscription_plans WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(PlanRow::into_plan).transpose()
    }

    async fn find_by_type(&self, plan_type: PlanType) -> Result<Option<SubscriptionPlan>> {
        let row =
            sqlx::query_as::<_, PlanRow>("SELECT * FROM subscription_plans WHERE plan_type = ?")
                .bind(plan_type.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PlanRow::into_plan).transpose()
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn insert(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, company_id, plan_id, status, jobs_posted, applications_viewed,
                start_date, end_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscription.id)
        .bind(&subscription.company_id)
        .bind(&subscription.plan_id)
        .bind(subscription.status.as_str())
        .bind(subscription.jobs_posted)
        .bind(subscription.applications_viewed)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Company {} already has an ACTIVE subscription",
                subscription.company_id
            )),
            other => other,
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    async fn find_active(&self, company_id: &CompanyId) -> Result<Option<Subscription>> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            "SELECT * FROM subscriptions WHERE company_id = ? AND status = 'ACTIVE'",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubscriptionRow::into_subscription).transpose()
    }

    async fn list_for_company(&self, company_id: &CompanyId) -> Result<Vec<Subscription>> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT * FROM subscriptions
            WHERE company_id = ?
            ORDER BY start_date ASC, rowid ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(SubscriptionRow::into_subscription)
            .collect()
    }

    async fn update_status(
        &self,
        id: &SubscriptionId,
        expected: SubscriptionStatus,
        status: SubscriptionStatus,
        end_date: Option<i64>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = ?, end_date = COALESCE(?, end_date)
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(status.as_str())
        .bind(end_date)
        .bind(id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM subscriptions WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;
            return Err(cas_failure("Subscription", id, current, expected.as_str()));
        }
        Ok(())
    }

    async fn try_increment_jobs_posted(
        &self,
        id: &SubscriptionId,
        max_jobs: i64,
    ) -> Result<bool> {
        // Check and increment in one statement; the loser of a race sees 0 rows
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET jobs_posted = jobs_posted + 1
            WHERE id = ? AND status = 'ACTIVE' AND jobs_posted < ?
            "#,
        )
        .bind(id)
        .bind(max_jobs)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn try_increment_applications_viewed(
        &self,
        id: &SubscriptionId,
        max_applications: i64,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET applications_viewed = applications_viewed + 1
            WHERE id = ? AND status = 'ACTIVE' AND applications_viewed < ?
            "#,
        )
        .bind(id)
        .bind(max_applications)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: String,
    plan_type: String,
    max_jobs: i64,
    max_applications: i64,
    price_cents: i64,
    duration_days: Option<i64>,
}

impl PlanRow {
    fn into_plan(self) -> Result<SubscriptionPlan> {
        Ok(SubscriptionPlan {
            id: self.id,
            plan_type: self.plan_type.parse()?,
            max_jobs: self.max_jobs,
            max_applications: self.max_applications,
            price_cents: self.price_cents,
            duration_days: self.duration_days,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: String,
    company_id: String,
    plan_id: String,
    status: String,
    jobs_posted: i64,
    applications_viewed: i64,
    start_date: i64,
    end_date: Option<i64>,
}

impl SubscriptionRow {
    fn into_subscription(self) -> Result<Subscription> {
        Ok(Subscription {
            id: self.id,
            company_id: self.company_id,
            plan_id: self.plan_id,
            status: self.status.parse()?,
            jobs_posted: self.jobs_posted,
            applications_viewed: self.applications_viewed,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

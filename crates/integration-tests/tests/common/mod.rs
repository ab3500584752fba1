//! Shared wiring for end-to-end tests: real SQLite adapters over an in-memory
//! pool, a manual clock and sequential ids.

#![allow(dead_code)]

use recruit_core::application::{
    notification_channel, ApplicationLifecycleManager, CompanyAccessResolver, EventLog,
    FreePlanDefaults, JobPublishingManager, JobSpec, NotificationWorker, PublishingPolicy,
    SubscriptionGate, SubscriptionManager,
};
use recruit_core::domain::{
    ApplicationEvent, Company, HrAssignment, Job, Notification, PlanType, SubscriptionPlan,
};
use recruit_core::port::id_provider::mocks::SequentialIdProvider;
use recruit_core::port::time_provider::mocks::MockTimeProvider;
use recruit_core::port::{
    ApplicationEventRepository, CompanyRepository, HrAssignmentRepository, NotificationRepository,
    PlanRepository,
};
use recruit_infra_sqlite::{
    create_pool, run_migrations, SqliteApplicationRepository, SqliteCompanyRepository,
    SqliteCvLookup, SqliteEventRepository, SqliteJobRepository, SqliteNotificationRepository,
    SqliteSubscriptionRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;

pub const T0: i64 = 1_700_000_000_000;
pub const DAY: i64 = 24 * 60 * 60 * 1000;

pub const COMPANY: &str = "acme";
pub const OWNER: &str = "owner-1";
pub const HR: &str = "hr-1";
pub const OUTSIDER: &str = "outsider-1";

pub struct TestApp {
    pub pool: SqlitePool,
    pub clock: Arc<MockTimeProvider>,
    pub lifecycle: Arc<ApplicationLifecycleManager>,
    pub publishing: Arc<JobPublishingManager>,
    pub subscriptions: Arc<SubscriptionManager>,
    pub gate: Arc<SubscriptionGate>,
    pub jobs: Arc<SqliteJobRepository>,
    pub applications: Arc<SqliteApplicationRepository>,
    pub events: Arc<SqliteEventRepository>,
    pub companies: Arc<SqliteCompanyRepository>,
    pub subscription_repo: Arc<SqliteSubscriptionRepository>,
    pub notifications: Arc<SqliteNotificationRepository>,
    pub worker: NotificationWorker,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_free_plan(FreePlanDefaults::default()).await
    }

    pub async fn with_free_plan(free_plan: FreePlanDefaults) -> Self {
        Self::build(free_plan, None).await
    }

    /// Same wiring, but notifications are written to `sink` instead of SQLite
    pub async fn with_notification_sink(sink: Arc<dyn NotificationRepository>) -> Self {
        Self::build(FreePlanDefaults::default(), Some(sink)).await
    }

    async fn build(
        free_plan: FreePlanDefaults,
        sink: Option<Arc<dyn NotificationRepository>>,
    ) -> Self {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let clock = Arc::new(MockTimeProvider::new(T0));
        let ids = Arc::new(SequentialIdProvider::new("id"));

        let jobs = Arc::new(SqliteJobRepository::new(pool.clone()));
        let applications = Arc::new(SqliteApplicationRepository::new(pool.clone()));
        let events = Arc::new(SqliteEventRepository::new(pool.clone()));
        let companies = Arc::new(SqliteCompanyRepository::new(pool.clone()));
        let subscription_repo = Arc::new(SqliteSubscriptionRepository::new(pool.clone()));
        let notifications = Arc::new(SqliteNotificationRepository::new(pool.clone()));

        let access = Arc::new(CompanyAccessResolver::new(
            companies.clone(),
            companies.clone(),
        ));
        let gate = Arc::new(SubscriptionGate::new(
            subscription_repo.clone(),
            subscription_repo.clone(),
            ids.clone(),
            clock.clone(),
            free_plan,
        ));
        let sink: Arc<dyn NotificationRepository> = match sink {
            Some(sink) => sink,
            None => notifications.clone(),
        };
        let (notifier, worker) = notification_channel(sink, ids.clone(), clock.clone());

        let lifecycle = Arc::new(ApplicationLifecycleManager::new(
            jobs.clone(),
            applications.clone(),
            Arc::new(EventLog::new(events.clone(), ids.clone(), clock.clone())),
            access.clone(),
            gate.clone(),
            Arc::new(SqliteCvLookup::new(pool.clone())),
            notifier,
            ids.clone(),
            clock.clone(),
        ));
        let publishing = Arc::new(JobPublishingManager::new(
            jobs.clone(),
            access.clone(),
            gate.clone(),
            ids.clone(),
            clock.clone(),
            PublishingPolicy::default(),
        ));
        let subscriptions = Arc::new(SubscriptionManager::new(
            access,
            gate.clone(),
            subscription_repo.clone(),
            subscription_repo.clone(),
            ids,
            clock.clone(),
        ));

        let app = Self {
            pool,
            clock,
            lifecycle,
            publishing,
            subscriptions,
            gate,
            jobs,
            applications,
            events,
            companies,
            subscription_repo,
            notifications,
            worker,
        };
        app.seed_company(COMPANY, OWNER).await;
        app.assign_hr(HR, COMPANY).await;
        app
    }

    pub async fn seed_company(&self, id: &str, owner_id: &str) {
        CompanyRepository::insert(
            &*self.companies,
            &Company {
                id: id.to_string(),
                name: format!("Company {}", id),
                owner_id: owner_id.to_string(),
                created_at: T0,
            },
        )
        .await
        .unwrap();
    }

    pub async fn assign_hr(&self, hr_user_id: &str, company_id: &str) {
        self.companies
            .upsert(&HrAssignment {
                hr_user_id: hr_user_id.to_string(),
                company_id: company_id.to_string(),
                is_active: true,
                assigned_at: T0,
            })
            .await
            .unwrap();
    }

    pub async fn seed_plan(&self, plan_type: PlanType, max_jobs: i64, duration_days: Option<i64>) {
        PlanRepository::insert(
            &*self.subscription_repo,
            &SubscriptionPlan {
                id: format!("plan-{}", plan_type.as_str().to_lowercase()),
                plan_type,
                max_jobs,
                max_applications: 500,
                price_cents: 9_900,
                duration_days,
            },
        )
        .await
        .unwrap();
    }

    pub async fn seed_primary_cv(&self, candidate_id: &str, url: &str) {
        sqlx::query(
            "INSERT INTO candidate_cvs (id, candidate_id, url, is_primary, uploaded_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(format!("cv-{}", candidate_id))
        .bind(candidate_id)
        .bind(url)
        .bind(T0)
        .execute(&self.pool)
        .await
        .unwrap();
    }

    /// Create and publish a job for `COMPANY` as the owner
    pub async fn published_job(&self, title: &str) -> Job {
        self.publishing
            .create(
                &COMPANY.to_string(),
                &OWNER.to_string(),
                JobSpec {
                    title: title.to_string(),
                    publish: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    pub async fn job(&self, job_id: &str) -> Job {
        self.publishing.get(&job_id.to_string()).await.unwrap().job
    }

    pub async fn events_for(&self, application_id: &str) -> Vec<ApplicationEvent> {
        self.events
            .list_for_application(&application_id.to_string())
            .await
            .unwrap()
    }

    /// Flush queued notifications, then read what `user_id` received
    pub async fn inbox(&mut self, user_id: &str) -> Vec<Notification> {
        self.worker.drain().await;
        self.notifications
            .list_for_user(&user_id.to_string())
            .await
            .unwrap()
    }
}

//! Job publishing and quota end-to-end tests
//!
//! Publishing consumes the company's subscription quota; the expiry sweep and
//! the job counters run against real SQLite adapters.

mod common;

use common::{TestApp, COMPANY, DAY, HR, OUTSIDER, OWNER, T0};
use recruit_core::application::{ExpirySweeper, FreePlanDefaults, JobSpec};
use recruit_core::domain::{JobStatus, PlanType, SubscriptionStatus};
use recruit_core::AppError;
use std::sync::Arc;

fn s(value: &str) -> String {
    value.to_string()
}

fn draft(title: &str) -> JobSpec {
    JobSpec {
        title: title.to_string(),
        ..Default::default()
    }
}

/// FREE plan with maxJobs = 1: the second publish is refused and nothing is consumed
#[tokio::test]
async fn test_free_plan_single_job_quota() {
    let app = TestApp::with_free_plan(FreePlanDefaults {
        max_jobs: 1,
        max_applications: 50,
    })
    .await;

    let staged = app
        .publishing
        .create(&s(COMPANY), &s(OWNER), draft("Staged role"))
        .await
        .unwrap();
    let first = app.published_job("First role").await;
    assert_eq!(first.status, JobStatus::Published);

    let err = app.publishing.publish(&staged.id, &s(OWNER)).await.unwrap_err();
    assert!(matches!(err, AppError::QuotaExceeded(_)), "got {:?}", err);
    assert_eq!(app.job(&staged.id).await.status, JobStatus::Draft);

    // At the ceiling even drafts are refused
    let err = app
        .publishing
        .create(&s(COMPANY), &s(HR), draft("One more"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::QuotaExceeded(_)));

    let (subscription, plan) = app.gate.active_subscription(&s(COMPANY)).await.unwrap();
    assert_eq!(plan.plan_type, PlanType::Free);
    assert_eq!(plan.max_jobs, 1);
    assert_eq!(subscription.jobs_posted, 1);
}

/// A company with no subscription gets FREE on first use, exactly once
#[tokio::test]
async fn test_free_auto_provisioning() {
    let app = TestApp::new().await;

    let status = app
        .subscriptions
        .quota_status(&s(COMPANY), &s(OWNER))
        .await
        .unwrap();
    assert_eq!(status.plan.plan_type, PlanType::Free);
    assert_eq!(status.subscription.status, SubscriptionStatus::Active);
    assert_eq!(status.jobs_remaining, 3);
    assert_eq!(status.applications_remaining, 50);

    app.published_job("Role").await;
    let again = app
        .subscriptions
        .quota_status(&s(COMPANY), &s(HR))
        .await
        .unwrap();
    assert_eq!(again.subscription.id, status.subscription.id);
    assert_eq!(again.jobs_remaining, 2);

    let history = app
        .subscriptions
        .history(&s(COMPANY), &s(OWNER))
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_publish_and_close_flow() {
    let app = TestApp::new().await;
    sqlx::query("INSERT INTO categories (id, name) VALUES ('eng', 'Engineering')")
        .execute(&app.pool)
        .await
        .unwrap();

    let job = app
        .publishing
        .create(
            &s(COMPANY),
            &s(HR),
            JobSpec {
                title: s("  Rust Engineer  "),
                description: s("Systems work"),
                category_id: Some(s("eng")),
                skill_ids: vec![s("rust"), s(" tokio "), s("rust"), s("")],
                tags: vec![s("remote")],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(job.title, "Rust Engineer");
    assert_eq!(job.status, JobStatus::Draft);
    assert_eq!(job.created_by, HR);

    let details = app.publishing.get(&job.id).await.unwrap();
    assert_eq!(details.skill_ids, vec![s("rust"), s("tokio")]);
    assert_eq!(details.tags, vec![s("remote")]);

    // Drafts consume nothing
    let (subscription, _) = app.gate.active_subscription(&s(COMPANY)).await.unwrap();
    assert_eq!(subscription.jobs_posted, 0);

    app.clock.advance(5_000);
    let published = app.publishing.publish(&job.id, &s(OWNER)).await.unwrap();
    assert_eq!(published.status, JobStatus::Published);
    assert_eq!(published.published_at, Some(T0 + 5_000));
    assert_eq!(published.expires_at, Some(T0 + 5_000 + 30 * DAY));

    let err = app.publishing.publish(&job.id, &s(OWNER)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let closed = app.publishing.close(&job.id, &s(OWNER)).await.unwrap();
    assert_eq!(closed.status, JobStatus::Closed);
    let err = app.publishing.close(&job.id, &s(OWNER)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Closing does not refund quota
    let (subscription, _) = app.gate.active_subscription(&s(COMPANY)).await.unwrap();
    assert_eq!(subscription.jobs_posted, 1);
}

#[tokio::test]
async fn test_create_rejects_bad_requests() {
    let app = TestApp::new().await;

    let err = app
        .publishing
        .create(&s(COMPANY), &s(OWNER), draft("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app
        .publishing
        .create(
            &s(COMPANY),
            &s(OWNER),
            JobSpec {
                title: s("Old news"),
                expires_at: Some(T0 - 1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app
        .publishing
        .create(
            &s(COMPANY),
            &s(OWNER),
            JobSpec {
                title: s("Uncategorized"),
                category_id: Some(s("no-such-category")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app
        .publishing
        .create(&s(COMPANY), &s(OUTSIDER), draft("Sneaky"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app
        .publishing
        .create(&s("no-such-company"), &s(OWNER), draft("Ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_sweep_expires_only_past_jobs() {
    let app = TestApp::new().await;

    let short = app
        .publishing
        .create(
            &s(COMPANY),
            &s(OWNER),
            JobSpec {
                title: s("Short-lived"),
                expires_at: Some(T0 + DAY),
                publish: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let long = app.published_job("Default lifetime").await;
    let staged = app
        .publishing
        .create(&s(COMPANY), &s(OWNER), draft("Still a draft"))
        .await
        .unwrap();

    // Nothing is due yet
    assert_eq!(app.publishing.sweep_expired().await.unwrap(), 0);

    app.clock.advance(2 * DAY);
    let sweeper = ExpirySweeper::new(app.publishing.clone(), 3600);
    assert_eq!(sweeper.run_now().await.unwrap(), 1);

    assert_eq!(app.job(&short.id).await.status, JobStatus::Expired);
    assert_eq!(app.job(&long.id).await.status, JobStatus::Published);
    assert_eq!(app.job(&staged.id).await.status, JobStatus::Draft);

    // Idempotent
    assert_eq!(app.publishing.sweep_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_job_views_count_only_published_jobs() {
    let app = TestApp::new().await;
    let job = app.published_job("Visible").await;

    app.publishing.record_job_view(&job.id).await.unwrap();
    app.publishing.record_job_view(&job.id).await.unwrap();
    assert_eq!(app.job(&job.id).await.view_count, 2);

    let staged = app
        .publishing
        .create(&s(COMPANY), &s(OWNER), draft("Hidden"))
        .await
        .unwrap();
    let err = app.publishing.record_job_view(&staged.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = app
        .publishing
        .record_job_view(&s("no-such-job"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// jobsPosted never passes maxJobs even when publishes race
#[tokio::test]
async fn test_concurrent_publish_respects_quota() {
    let app = TestApp::with_free_plan(FreePlanDefaults {
        max_jobs: 2,
        max_applications: 50,
    })
    .await;

    let mut drafts = Vec::new();
    for i in 0..5 {
        let job = app
            .publishing
            .create(&s(COMPANY), &s(OWNER), draft(&format!("Role {}", i)))
            .await
            .unwrap();
        drafts.push(job.id);
    }

    let mut handles = Vec::new();
    for job_id in drafts.clone() {
        let publishing = Arc::clone(&app.publishing);
        handles.push(tokio::spawn(async move {
            publishing.publish(&job_id, &OWNER.to_string()).await
        }));
    }

    let mut published = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => published += 1,
            Err(AppError::QuotaExceeded(_)) => {}
            Err(e) => panic!("unexpected publish error: {:?}", e),
        }
    }
    assert_eq!(published, 2);

    let (subscription, _) = app.gate.active_subscription(&s(COMPANY)).await.unwrap();
    assert_eq!(subscription.jobs_posted, 2);

    let mut live = 0;
    for job_id in &drafts {
        match app.job(job_id).await.status {
            JobStatus::Published => live += 1,
            JobStatus::Draft => {}
            other => panic!("unexpected status {}", other),
        }
    }
    assert_eq!(live, 2);
}

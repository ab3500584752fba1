// Recruit Infrastructure - SQLite Adapter
// Implements every recruit-core repository port plus the CV lookup

mod application_repository;
mod company_repository;
mod connection;
mod cv_lookup;
mod error;
mod event_repository;
mod job_repository;
mod migration;
mod notification_repository;
mod subscription_repository;

pub use application_repository::SqliteApplicationRepository;
pub use company_repository::SqliteCompanyRepository;
pub use connection::create_pool;
pub use cv_lookup::SqliteCvLookup;
pub use event_repository::SqliteEventRepository;
pub use job_repository::SqliteJobRepository;
pub use migration::run_migrations;
pub use notification_repository::SqliteNotificationRepository;
pub use subscription_repository::SqliteSubscriptionRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{create_pool, run_migrations};
    use sqlx::SqlitePool;

    pub async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    pub async fn seed_company(pool: &SqlitePool, id: &str, owner_id: &str) {
        sqlx::query("INSERT INTO companies (id, name, owner_id, created_at) VALUES (?, ?, ?, 0)")
            .bind(id)
            .bind(format!("Company {}", id))
            .bind(owner_id)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn seed_category(pool: &SqlitePool, id: &str) {
        sqlx::query("INSERT INTO categories (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn seed_job(pool: &SqlitePool, id: &str, company_id: &str, status: &str) {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, company_id, title, status, created_by, created_at)
            VALUES (?, ?, 'Engineer', ?, 'owner-1', 0)
            "#,
        )
        .bind(id)
        .bind(company_id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn seed_application(pool: &SqlitePool, id: &str, job_id: &str, candidate_id: &str) {
        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, candidate_id, status, created_at, updated_at)
            VALUES (?, ?, ?, 'SUBMITTED', 0, 0)
            "#,
        )
        .bind(id)
        .bind(job_id)
        .bind(candidate_id)
        .execute(pool)
        .await
        .unwrap();
    }
}

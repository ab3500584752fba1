// SQLite JobRepository Implementation

use crate::error::{cas_failure, map_sqlx_error};
use async_trait::async_trait;
use recruit_core::domain::{Job, JobId, JobStatus};
use recruit_core::error::Result;
use recruit_core::port::JobRepository;
use sqlx::SqlitePool;

pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqliteJobRepository {
    async fn insert(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (
                id, company_id, title, description, category_id, status,
                view_count, application_count, created_by, created_at,
                published_at, expires_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.company_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.category_id)
        .bind(job.status.as_str())
        .bind(job.view_count)
        .bind(job.application_count)
        .bind(&job.created_by)
        .bind(job.created_at)
        .bind(job.published_at)
        .bind(job.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn update_status(&self, job: &Job, expected: JobStatus) -> Result<()> {
        // Conditional update: a concurrent status change wins, we report it
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, published_at = ?, expires_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(job.status.as_str())
        .bind(job.published_at)
        .bind(job.expires_at)
        .bind(&job.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?")
                    .bind(&job.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;
            return Err(cas_failure("Job", &job.id, current, expected.as_str()));
        }

        Ok(())
    }

    async fn category_exists(&self, category_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }

    async fn attach_skills(&self, id: &JobId, skill_ids: &[String]) -> Result<()> {
        for skill_id in skill_ids {
            sqlx::query("INSERT OR IGNORE INTO job_skills (job_id, skill_id) VALUES (?, ?)")
                .bind(id)
                .bind(skill_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    async fn attach_tags(&self, id: &JobId, tags: &[String]) -> Result<()> {
        for tag in tags {
            sqlx::query("INSERT OR IGNORE INTO job_tags (job_id, tag) VALUES (?, ?)")
                .bind(id)
                .bind(tag)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        }
        Ok(())
    }

    async fn find_skills(&self, id: &JobId) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT skill_id FROM job_skills WHERE job_id = ? ORDER BY skill_id")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_tags(&self, id: &JobId) -> Result<Vec<String>> {
        sqlx::query_scalar("SELECT tag FROM job_tags WHERE job_id = ? ORDER BY tag")
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn increment_application_count(&self, id: &JobId) -> Result<()> {
        // Atomic increment without reading
        sqlx::query("UPDATE jobs SET application_count = application_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn decrement_application_count(&self, id: &JobId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET application_count = MAX(application_count - 1, 0)
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn increment_view_count(&self, id: &JobId) -> Result<()> {
        sqlx::query("UPDATE jobs SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn recount_applications(&self, id: &JobId) -> Result<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE jobs
            SET application_count = (SELECT COUNT(*) FROM applications WHERE job_id = jobs.id)
            WHERE id = ?
            RETURNING application_count
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        count.ok_or_else(|| recruit_core::AppError::not_found("Job", id))
    }

    async fn expire_published(&self, now_millis: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = 'EXPIRED'
            WHERE status = 'PUBLISHED'
              AND expires_at IS NOT NULL
              AND expires_at <= ?
            "#,
        )
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    company_id: String,
    title: String,
    description: String,
    category_id: Option<String>,
    status: String,
    view_count: i64,
    application_count: i64,
    created_by: String,
    created_at: i64,
    published_at: Option<i64>,
    expires_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        Ok(Job {
            id: self.id,
            company_id: self.company_id,
            title: self.title,
            description: self.description,
            category_id: self.category_id,
            status: self.status.parse()?,
            view_count: self.view_count,
            application_count: self.application_count,
            created_by: self.created_by,
            created_at: self.created_at,
            published_at: self.published_at,
            expires_at: self.expires_at,
        })
    }
}

// SQLite ApplicationRepository Implementation

use crate::error::{cas_failure, map_sqlx_error};
use async_trait::async_trait;
use recruit_core::domain::{Application, ApplicationId, ApplicationStatus, CandidateId, JobId};
use recruit_core::error::{AppError, Result};
use recruit_core::port::ApplicationRepository;
use sqlx::SqlitePool;

pub struct SqliteApplicationRepository {
    pool: SqlitePool,
}

impl SqliteApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn current_status(&self, id: &ApplicationId) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT status FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepository {
    async fn insert(&self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, job_id, candidate_id, status, cover_letter, cv_url,
                reviewed_by, reviewed_at, employer_notes,
                interview_scheduled_at, interview_notes,
                view_count, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.job_id)
        .bind(&application.candidate_id)
        .bind(application.status.as_str())
        .bind(&application.cover_letter)
        .bind(&application.cv_url)
        .bind(&application.reviewed_by)
        .bind(application.reviewed_at)
        .bind(&application.employer_notes)
        .bind(application.interview_scheduled_at)
        .bind(&application.interview_notes)
        .bind(application.view_count)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Candidate {} already applied to job {}",
                application.candidate_id, application.job_id
            )),
            other => other,
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ApplicationRow::into_application).transpose()
    }

    async fn find_by_job_and_candidate(
        &self,
        job_id: &JobId,
        candidate_id: &CandidateId,
    ) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE job_id = ? AND candidate_id = ?",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ApplicationRow::into_application).transpose()
    }

    async fn update_review(
        &self,
        application: &Application,
        expected: ApplicationStatus,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = ?, reviewed_by = ?, reviewed_at = ?, employer_notes = ?,
                interview_scheduled_at = ?, interview_notes = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(application.status.as_str())
        .bind(&application.reviewed_by)
        .bind(application.reviewed_at)
        .bind(&application.employer_notes)
        .bind(application.interview_scheduled_at)
        .bind(&application.interview_notes)
        .bind(application.updated_at)
        .bind(&application.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current = self.current_status(&application.id).await?;
            return Err(cas_failure(
                "Application",
                &application.id,
                current,
                expected.as_str(),
            ));
        }
        Ok(())
    }

    async fn increment_view_count(&self, id: &ApplicationId) -> Result<()> {
        sqlx::query("UPDATE applications SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: &ApplicationId, expected: ApplicationStatus) -> Result<()> {
        // Events go with the row (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM applications WHERE id = ? AND status = ?")
            .bind(id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current = self.current_status(id).await?;
            return Err(cas_failure("Application", id, current, expected.as_str()));
        }
        Ok(())
    }

    async fn count_for_job(&self, job_id: &JobId) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = ?")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    job_id: String,
    candidate_id: String,
    status: String,
    cover_letter: Option<String>,
    cv_url: Option<String>,
    reviewed_by: Option<String>,
    reviewed_at: Option<i64>,
    employer_notes: Option<String>,
    interview_scheduled_at: Option<i64>,
    interview_notes: Option<String>,
    view_count: i64,
    created_at: i64,
    updated_at: i64,
}

impl ApplicationRow {
    fn into_application(self) -> Result<Application> {
        Ok(Application {
            id: self.id,
            job_id: self.job_id,
            candidate_id: self.candidate_id,
            status: self.status.parse()?,
            cover_letter: self.cover_letter,
            cv_url: self.cv_url,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            employer_notes: self.employer_notes,
            interview_scheduled_at: self.interview_scheduled_at,
            interview_notes: self.interview_notes,
            view_count: self.view_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_company, seed_job, setup_test_db};

    async fn repo() -> SqliteApplicationRepository {
        let pool = setup_test_db().await;
        seed_company(&pool, "c-1", "owner-1").await;
        seed_job(&pool, "job-1", "c-1", "PUBLISHED").await;
        SqliteApplicationRepository::new(pool)
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_conflict() {
        let repo = repo().await;
        repo.insert(&Application::new("app-1", 1_000, "job-1", "cand-1"))
            .await
            .unwrap();

        let err = repo
            .insert(&Application::new("app-2", 2_000, "job-1", "cand-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.count_for_job(&"job-1".to_string()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_review_compare_and_set() {
        let repo = repo().await;
        let mut app = Application::new("app-1", 1_000, "job-1", "cand-1");
        repo.insert(&app).await.unwrap();

        app.status = ApplicationStatus::Shortlisted;
        app.reviewed_by = Some("hr-1".to_string());
        app.reviewed_at = Some(2_000);
        app.employer_notes = Some("strong".to_string());
        repo.update_review(&app, ApplicationStatus::Submitted)
            .await
            .unwrap();

        let stored = repo.find_by_id(&app.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ApplicationStatus::Shortlisted);
        assert_eq!(stored.employer_notes.as_deref(), Some("strong"));

        let err = repo
            .update_review(&app, ApplicationStatus::Submitted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_delete_requires_expected_status() {
        let repo = repo().await;
        let app = Application::new("app-1", 1_000, "job-1", "cand-1");
        repo.insert(&app).await.unwrap();

        let err = repo
            .delete(&app.id, ApplicationStatus::Reviewing)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        repo.delete(&app.id, ApplicationStatus::Submitted).await.unwrap();
        assert!(repo.find_by_id(&app.id).await.unwrap().is_none());

        let err = repo
            .delete(&app.id, ApplicationStatus::Submitted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

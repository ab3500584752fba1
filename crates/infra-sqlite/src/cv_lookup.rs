// SQLite CvLookup Implementation
// Reads the CV table maintained by the document-storage service

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recruit_core::domain::CandidateId;
use recruit_core::error::Result;
use recruit_core::port::CvLookup;
use sqlx::SqlitePool;

pub struct SqliteCvLookup {
    pool: SqlitePool,
}

impl SqliteCvLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CvLookup for SqliteCvLookup {
    async fn primary_cv_url(&self, candidate_id: &CandidateId) -> Result<Option<String>> {
        sqlx::query_scalar(
            r#"
            SELECT url FROM candidate_cvs
            WHERE candidate_id = ? AND is_primary = 1
            ORDER BY uploaded_at DESC
            LIMIT 1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_test_db;

    #[tokio::test]
    async fn test_primary_cv_only() {
        let pool = setup_test_db().await;
        sqlx::query(
            r#"
            INSERT INTO candidate_cvs (id, candidate_id, url, is_primary, uploaded_at) VALUES
                ('cv-1', 'cand-1', 'https://cdn.example/old.pdf', 0, 1),
                ('cv-2', 'cand-1', 'https://cdn.example/main.pdf', 1, 2)
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        let lookup = SqliteCvLookup::new(pool);

        assert_eq!(
            lookup.primary_cv_url(&"cand-1".to_string()).await.unwrap(),
            Some("https://cdn.example/main.pdf".to_string())
        );
        assert_eq!(lookup.primary_cv_url(&"cand-2".to_string()).await.unwrap(), None);
    }
}

// SQLite Company & HR assignment repositories

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recruit_core::domain::{Company, CompanyId, HrAssignment, UserId};
use recruit_core::error::Result;
use recruit_core::port::{CompanyRepository, HrAssignmentRepository};
use sqlx::SqlitePool;

/// Implements both [`CompanyRepository`] and [`HrAssignmentRepository`]
pub struct SqliteCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for SqliteCompanyRepository {
    async fn insert(&self, company: &Company) -> Result<()> {
        sqlx::query("INSERT INTO companies (id, name, owner_id, created_at) VALUES (?, ?, ?, ?)")
            .bind(&company.id)
            .bind(&company.name)
            .bind(&company.owner_id)
            .bind(company.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(CompanyRow::into_company))
    }

    async fn find_owned_by(&self, user_id: &UserId) -> Result<Vec<CompanyId>> {
        sqlx::query_scalar("SELECT id FROM companies WHERE owner_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl HrAssignmentRepository for SqliteCompanyRepository {
    async fn upsert(&self, assignment: &HrAssignment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hr_assignments (hr_user_id, company_id, is_active, assigned_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (hr_user_id, company_id)
            DO UPDATE SET is_active = excluded.is_active, assigned_at = excluded.assigned_at
            "#,
        )
        .bind(&assignment.hr_user_id)
        .bind(&assignment.company_id)
        .bind(assignment.is_active)
        .bind(assignment.assigned_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn active_company_ids_for(&self, hr_user_id: &UserId) -> Result<Vec<CompanyId>> {
        sqlx::query_scalar(
            "SELECT company_id FROM hr_assignments WHERE hr_user_id = ? AND is_active = 1",
        )
        .bind(hr_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }

    async fn active_hr_for_company(&self, company_id: &CompanyId) -> Result<Vec<UserId>> {
        sqlx::query_scalar(
            r#"
            SELECT hr_user_id FROM hr_assignments
            WHERE company_id = ? AND is_active = 1
            ORDER BY assigned_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRow {
    id: String,
    name: String,
    owner_id: String,
    created_at: i64,
}

impl CompanyRow {
    fn into_company(self) -> Company {
        Company {
            id: self.id,
            name: self.name,
            owner_id: self.owner_id,
            created_at: self.created_at,
        }
    }
}

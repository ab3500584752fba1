// Company & HR Assignment Repository Ports

use crate::domain::{Company, CompanyId, HrAssignment, UserId};
use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn insert(&self, company: &Company) -> Result<()>;

    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>>;

    /// IDs of companies owned by `user_id`
    async fn find_owned_by(&self, user_id: &UserId) -> Result<Vec<CompanyId>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HrAssignmentRepository: Send + Sync {
    /// Insert or update (unique per hr_user_id, company_id)
    async fn upsert(&self, assignment: &HrAssignment) -> Result<()>;

    /// Companies where `hr_user_id` holds an active assignment
    async fn active_company_ids_for(&self, hr_user_id: &UserId) -> Result<Vec<CompanyId>>;

    /// HR users actively assigned to a company
    async fn active_hr_for_company(&self, company_id: &CompanyId) -> Result<Vec<UserId>>;
}

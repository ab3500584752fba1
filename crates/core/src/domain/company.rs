// Company & HR assignment records

use super::UserId;
use serde::{Deserialize, Serialize};

pub type CompanyId = String;

/// Organization that owns Jobs (exactly one owner)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: i64,
}

/// Grants a non-owner user authority over a Company
///
/// Unique per (hr_user_id, company_id); inactive rows grant nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrAssignment {
    pub hr_user_id: UserId,
    pub company_id: CompanyId,
    pub is_active: bool,
    pub assigned_at: i64,
}

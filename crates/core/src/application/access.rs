//! Company access resolution
//!
//! An actor may act for a company when they own it or hold an active HR
//! assignment on it. Every authorization check in the core goes through here.

use crate::domain::{CompanyId, UserId};
use crate::error::{AppError, Result};
use crate::port::{CompanyRepository, HrAssignmentRepository};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct CompanyAccessResolver {
    companies: Arc<dyn CompanyRepository>,
    hr_assignments: Arc<dyn HrAssignmentRepository>,
}

impl CompanyAccessResolver {
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        hr_assignments: Arc<dyn HrAssignmentRepository>,
    ) -> Self {
        Self {
            companies,
            hr_assignments,
        }
    }

    /// Owned companies ∪ companies with an active HR assignment
    ///
    /// An unavailable HR-assignment store degrades to the owned-only set.
    pub async fn companies_for(&self, actor_id: &UserId) -> Result<HashSet<CompanyId>> {
        let mut companies: HashSet<CompanyId> =
            self.companies.find_owned_by(actor_id).await?.into_iter().collect();

        match self.hr_assignments.active_company_ids_for(actor_id).await {
            Ok(assigned) => companies.extend(assigned),
            Err(e) => {
                warn!(
                    actor_id = %actor_id,
                    error = %e,
                    "HR assignment lookup failed, falling back to owned companies"
                );
            }
        }

        Ok(companies)
    }

    pub async fn can_act_for(&self, actor_id: &UserId, company_id: &CompanyId) -> Result<bool> {
        Ok(self.companies_for(actor_id).await?.contains(company_id))
    }

    /// Fails with `Forbidden` unless the actor may act for the company
    pub async fn authorize(&self, actor_id: &UserId, company_id: &CompanyId) -> Result<()> {
        if self.can_act_for(actor_id, company_id).await? {
            return Ok(());
        }
        debug!(actor_id = %actor_id, company_id = %company_id, "Access denied");
        Err(AppError::Forbidden(format!(
            "User {} may not act for company {}",
            actor_id, company_id
        )))
    }

    /// Owner plus active HR users of a company, deduplicated
    pub async fn company_team(&self, company_id: &CompanyId) -> Result<Vec<UserId>> {
        let company = self
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| AppError::not_found("Company", company_id))?;

        let mut seen = HashSet::new();
        let mut team = Vec::new();
        if seen.insert(company.owner_id.clone()) {
            team.push(company.owner_id);
        }

        match self.hr_assignments.active_hr_for_company(company_id).await {
            Ok(hr_users) => {
                for user in hr_users {
                    if seen.insert(user.clone()) {
                        team.push(user);
                    }
                }
            }
            Err(e) => {
                warn!(
                    company_id = %company_id,
                    error = %e,
                    "HR assignment lookup failed, team limited to owner"
                );
            }
        }

        Ok(team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Company;
    use crate::port::company_repository::{MockCompanyRepository, MockHrAssignmentRepository};
    use tokio_test::{assert_err, assert_ok};

    fn resolver(
        companies: MockCompanyRepository,
        hr: MockHrAssignmentRepository,
    ) -> CompanyAccessResolver {
        CompanyAccessResolver::new(Arc::new(companies), Arc::new(hr))
    }

    #[tokio::test]
    async fn test_companies_for_unions_owned_and_assigned() {
        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_owned_by()
            .returning(|_| Ok(vec!["c-owned".to_string()]));
        let mut hr = MockHrAssignmentRepository::new();
        hr.expect_active_company_ids_for()
            .returning(|_| Ok(vec!["c-hr".to_string(), "c-owned".to_string()]));

        let set = resolver(companies, hr)
            .companies_for(&"user-1".to_string())
            .await
            .unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.contains("c-owned"));
        assert!(set.contains("c-hr"));
    }

    #[tokio::test]
    async fn test_hr_store_unavailable_falls_back_to_owned() {
        let mut companies = MockCompanyRepository::new();
        companies
            .expect_find_owned_by()
            .returning(|_| Ok(vec!["c-owned".to_string()]));
        let mut hr = MockHrAssignmentRepository::new();
        hr.expect_active_company_ids_for()
            .returning(|_| Err(AppError::Database("connection refused".to_string())));

        let access = resolver(companies, hr);
        let set = access.companies_for(&"user-1".to_string()).await.unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("c-owned"));
    }

    #[tokio::test]
    async fn test_authorize_forbidden_for_stranger() {
        let mut companies = MockCompanyRepository::new();
        companies.expect_find_owned_by().returning(|_| Ok(vec![]));
        let mut hr = MockHrAssignmentRepository::new();
        hr.expect_active_company_ids_for()
            .returning(|_| Ok(vec!["c-1".to_string()]));

        let access = resolver(companies, hr);
        assert_ok!(
            access
                .authorize(&"hr-1".to_string(), &"c-1".to_string())
                .await
        );
        let err = assert_err!(
            access
                .authorize(&"hr-1".to_string(), &"c-2".to_string())
                .await
        );
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_company_team_dedups_owner() {
        let mut companies = MockCompanyRepository::new();
        companies.expect_find_by_id().returning(|id| {
            Ok(Some(Company {
                id: id.clone(),
                name: "Acme".to_string(),
                owner_id: "owner".to_string(),
                created_at: 0,
            }))
        });
        let mut hr = MockHrAssignmentRepository::new();
        hr.expect_active_hr_for_company().returning(|_| {
            Ok(vec![
                "hr-a".to_string(),
                "owner".to_string(),
                "hr-b".to_string(),
                "hr-a".to_string(),
            ])
        });

        let team = resolver(companies, hr)
            .company_team(&"c-1".to_string())
            .await
            .unwrap();
        assert_eq!(team, vec!["owner", "hr-a", "hr-b"]);
    }
}

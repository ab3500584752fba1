// Subscription & Plan records

use super::company::CompanyId;
use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type PlanId = String;
pub type SubscriptionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Free => "FREE",
            PlanType::Basic => "BASIC",
            PlanType::Premium => "PREMIUM",
            PlanType::Enterprise => "ENTERPRISE",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FREE" => Ok(PlanType::Free),
            "BASIC" => Ok(PlanType::Basic),
            "PREMIUM" => Ok(PlanType::Premium),
            "ENTERPRISE" => Ok(PlanType::Enterprise),
            other => Err(DomainError::UnknownVariant {
                kind: "plan type",
                value: other.to_string(),
            }),
        }
    }
}

/// Template for quota limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub plan_type: PlanType,
    pub max_jobs: i64,
    pub max_applications: i64,
    pub price_cents: i64,
    pub duration_days: Option<i64>,
}

/// PENDING -> ACTIVE -> CANCELLED (FREE subscriptions start ACTIVE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "PENDING",
            SubscriptionStatus::Active => "ACTIVE",
            SubscriptionStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn validate_transition(&self, target: SubscriptionStatus) -> Result<()> {
        let allowed = matches!(
            (self, target),
            (SubscriptionStatus::Pending, SubscriptionStatus::Active)
                | (SubscriptionStatus::Pending, SubscriptionStatus::Cancelled)
                | (SubscriptionStatus::Active, SubscriptionStatus::Cancelled)
        );
        if allowed {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(SubscriptionStatus::Pending),
            "ACTIVE" => Ok(SubscriptionStatus::Active),
            "CANCELLED" => Ok(SubscriptionStatus::Cancelled),
            other => Err(DomainError::UnknownVariant {
                kind: "subscription status",
                value: other.to_string(),
            }),
        }
    }
}

/// A Company's plan instance. Superseded, never re-planned in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub company_id: CompanyId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub jobs_posted: i64,
    pub applications_viewed: i64,
    pub start_date: i64,
    pub end_date: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_status_graph() {
        use SubscriptionStatus::*;

        assert!(Pending.validate_transition(Active).is_ok());
        assert!(Active.validate_transition(Cancelled).is_ok());
        assert!(Pending.validate_transition(Cancelled).is_ok());

        assert!(Cancelled.validate_transition(Active).is_err());
        assert!(Active.validate_transition(Pending).is_err());
        assert!(Active.validate_transition(Active).is_err());
    }

    #[test]
    fn test_plan_type_parse() {
        assert_eq!("PREMIUM".parse::<PlanType>().unwrap(), PlanType::Premium);
        assert!("premium".parse::<PlanType>().is_err());
    }
}

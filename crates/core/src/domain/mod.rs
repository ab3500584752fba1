// Domain Layer - Plain data records and the status graphs that govern them

pub mod application;
pub mod company;
pub mod error;
pub mod event;
pub mod job;
pub mod notification;
pub mod subscription;

/// Generic user identifier supplied by the identity provider
pub type UserId = String;

// Re-exports
pub use application::{Application, ApplicationId, ApplicationStatus, CandidateId};
pub use company::{Company, CompanyId, HrAssignment};
pub use error::DomainError;
pub use event::{ApplicationEvent, ApplicationEventType, EventId};
pub use job::{Job, JobId, JobStatus};
pub use notification::{Notification, NotificationId, NotificationType};
pub use subscription::{
    PlanId, PlanType, Subscription, SubscriptionId, SubscriptionPlan, SubscriptionStatus,
};

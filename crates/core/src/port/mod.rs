// Port Layer - Interfaces for external dependencies

pub mod application_repository;
pub mod company_repository;
pub mod cv_lookup;
pub mod event_repository;
pub mod id_provider; // For deterministic testing
pub mod job_repository;
pub mod notification_repository;
pub mod subscription_repository;
pub mod time_provider;

// Re-exports
pub use application_repository::ApplicationRepository;
pub use company_repository::{CompanyRepository, HrAssignmentRepository};
pub use cv_lookup::CvLookup;
pub use event_repository::ApplicationEventRepository;
pub use id_provider::IdProvider;
pub use job_repository::JobRepository;
pub use notification_repository::NotificationRepository;
pub use subscription_repository::{PlanRepository, SubscriptionRepository};
pub use time_provider::TimeProvider;

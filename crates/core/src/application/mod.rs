// Application Layer - Use Cases and Business Logic

pub mod access;
pub mod event_log;
pub mod lifecycle;
pub mod notification;
pub mod publishing;
pub mod shutdown;
pub mod subscription;

// Re-exports
pub use access::CompanyAccessResolver;
pub use event_log::{EventLog, NewEvent};
pub use lifecycle::ApplicationLifecycleManager;
pub use notification::{
    notification_channel, DeliveryStats, NotificationDispatcher, NotificationRequest,
    NotificationWorker,
};
pub use publishing::{ExpirySweeper, JobDetails, JobPublishingManager, JobSpec, PublishingPolicy};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use subscription::{
    FreePlanDefaults, QuotaDecision, QuotaStatus, SubscriptionGate, SubscriptionManager,
};

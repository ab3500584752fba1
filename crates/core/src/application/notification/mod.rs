//! Best-effort notifications
//!
//! Services enqueue [`NotificationRequest`]s through a [`NotificationDispatcher`];
//! a single [`NotificationWorker`] task persists them. Dispatch never fails the
//! caller: a closed queue or a failed insert is logged and dropped.

use crate::application::shutdown::ShutdownToken;
use crate::domain::{Notification, NotificationType, UserId};
use crate::error::Result;
use crate::port::{IdProvider, NotificationRepository, TimeProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub user_id: UserId,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub related_entity_id: Option<String>,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<NotificationRequest>,
}

impl NotificationDispatcher {
    pub fn notify(&self, request: NotificationRequest) {
        let user_id = request.user_id.clone();
        let notification_type = request.notification_type;
        if self.tx.send(request).is_err() {
            warn!(
                user_id = %user_id,
                notification_type = %notification_type,
                "Notification queue closed, dropping notification"
            );
        }
    }

    /// Fan out one message to several recipients, each user at most once
    pub fn notify_many(
        &self,
        recipients: &[UserId],
        notification_type: NotificationType,
        title: &str,
        body: &str,
        related_entity_id: Option<&str>,
    ) {
        let mut seen = HashSet::new();
        for user_id in recipients {
            if !seen.insert(user_id.as_str()) {
                continue;
            }
            self.notify(NotificationRequest {
                user_id: user_id.clone(),
                notification_type,
                title: title.to_string(),
                body: body.to_string(),
                related_entity_id: related_entity_id.map(str::to_string),
            });
        }
    }
}

/// Counters from one drain of the queue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

pub struct NotificationWorker {
    rx: mpsc::UnboundedReceiver<NotificationRequest>,
    repo: Arc<dyn NotificationRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

/// Create a connected dispatcher/worker pair
pub fn notification_channel(
    repo: Arc<dyn NotificationRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
) -> (NotificationDispatcher, NotificationWorker) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        NotificationDispatcher { tx },
        NotificationWorker {
            rx,
            repo,
            id_provider,
            time_provider,
        },
    )
}

impl NotificationWorker {
    /// Deliver until shutdown, then flush whatever is already queued
    pub async fn run(mut self, mut shutdown: ShutdownToken) {
        info!("Notification worker started");

        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                next = self.rx.recv() => match next {
                    Some(request) => {
                        let _ = self.deliver(request).await;
                    }
                    None => break,
                },
            }
        }

        let stats = self.drain().await;
        info!(
            flushed = stats.delivered,
            failed = stats.failed,
            "Notification worker stopped"
        );
    }

    /// Deliver everything currently queued without waiting for more
    pub async fn drain(&mut self) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        while let Ok(request) = self.rx.try_recv() {
            match self.deliver(request).await {
                Ok(_) => stats.delivered += 1,
                Err(_) => stats.failed += 1,
            }
        }
        stats
    }

    pub async fn deliver(&self, request: NotificationRequest) -> Result<Notification> {
        let notification = Notification {
            id: self.id_provider.generate_id(),
            user_id: request.user_id,
            notification_type: request.notification_type,
            title: request.title,
            body: request.body,
            related_entity_id: request.related_entity_id,
            is_read: false,
            created_at: self.time_provider.now_millis(),
        };

        match self.repo.insert(&notification).await {
            Ok(()) => {
                debug!(
                    user_id = %notification.user_id,
                    notification_type = %notification.notification_type,
                    "Notification delivered"
                );
                Ok(notification)
            }
            Err(e) => {
                error!(
                    user_id = %notification.user_id,
                    notification_type = %notification.notification_type,
                    error = %e,
                    "Failed to deliver notification"
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::notification_repository::MockNotificationRepository;
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn channel(repo: MockNotificationRepository) -> (NotificationDispatcher, NotificationWorker) {
        notification_channel(
            Arc::new(repo),
            Arc::new(SequentialIdProvider::new("ntf")),
            Arc::new(MockTimeProvider::new(5_000)),
        )
    }

    #[tokio::test]
    async fn test_notify_many_dedups_recipients() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_insert().times(2).returning(|_| Ok(()));
        let (dispatcher, mut worker) = channel(repo);

        dispatcher.notify_many(
            &["owner".to_string(), "hr".to_string(), "owner".to_string()],
            NotificationType::NewApplication,
            "New application",
            "Someone applied",
            Some("app-1"),
        );

        let stats = worker.drain().await;
        assert_eq!(stats, DeliveryStats { delivered: 2, failed: 0 });
    }

    #[tokio::test]
    async fn test_failed_insert_is_counted_not_raised() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::Database("disk I/O error".to_string())));
        let (dispatcher, mut worker) = channel(repo);

        dispatcher.notify(NotificationRequest {
            user_id: "cand-1".to_string(),
            notification_type: NotificationType::ApplicationViewed,
            title: "Viewed".to_string(),
            body: "An employer viewed your CV".to_string(),
            related_entity_id: None,
        });

        let stats = worker.drain().await;
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 0);
    }

    #[tokio::test]
    async fn test_notify_after_worker_dropped_does_not_panic() {
        let repo = MockNotificationRepository::new();
        let (dispatcher, worker) = channel(repo);
        drop(worker);

        dispatcher.notify(NotificationRequest {
            user_id: "cand-1".to_string(),
            notification_type: NotificationType::ApplicationRejected,
            title: "Update".to_string(),
            body: "body".to_string(),
            related_entity_id: None,
        });
    }

    #[tokio::test]
    async fn test_run_flushes_queue_on_shutdown() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_insert()
            .withf(|n| n.id.starts_with("ntf-") && n.created_at == 5_000 && !n.is_read)
            .times(3)
            .returning(|_| Ok(()));
        let (dispatcher, worker) = channel(repo);

        for user in ["a", "b", "c"] {
            dispatcher.notify(NotificationRequest {
                user_id: user.to_string(),
                notification_type: NotificationType::ApplicationShortlisted,
                title: "Shortlisted".to_string(),
                body: "body".to_string(),
                related_entity_id: Some("app-1".to_string()),
            });
        }

        let (tx, token) = crate::application::shutdown::shutdown_channel();
        tx.shutdown();
        worker.run(token).await;
    }
}

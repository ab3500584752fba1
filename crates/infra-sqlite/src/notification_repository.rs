// SQLite NotificationRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recruit_core::domain::{Notification, UserId};
use recruit_core::error::Result;
use recruit_core::port::NotificationRepository;
use sqlx::SqlitePool;

pub struct SqliteNotificationRepository {
    pool: SqlitePool,
}

impl SqliteNotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for SqliteNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (
                id, user_id, notification_type, title, body,
                related_entity_id, is_read, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(notification.notification_type.as_str())
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.related_entity_id)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Notification>> {
        let rows: Vec<NotificationRow> = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(NotificationRow::into_notification)
            .collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: String,
    user_id: String,
    notification_type: String,
    title: String,
    body: String,
    related_entity_id: Option<String>,
    is_read: bool,
    created_at: i64,
}

impl NotificationRow {
    fn into_notification(self) -> Result<Notification> {
        Ok(Notification {
            id: self.id,
            user_id: self.user_id,
            notification_type: self.notification_type.parse()?,
            title: self.title,
            body: self.body,
            related_entity_id: self.related_entity_id,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

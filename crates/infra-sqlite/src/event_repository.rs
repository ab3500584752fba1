// SQLite ApplicationEventRepository Implementation (append-only)

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use recruit_core::domain::{ApplicationEvent, ApplicationEventType, ApplicationId, UserId};
use recruit_core::error::Result;
use recruit_core::port::ApplicationEventRepository;
use sqlx::SqlitePool;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationEventRepository for SqliteEventRepository {
    async fn append(&self, event: &ApplicationEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO application_events (
                id, application_id, event_type, old_status, new_status,
                triggered_by, description, visible_to_candidate, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.application_id)
        .bind(event.event_type.as_str())
        .bind(event.old_status.map(|s| s.as_str()))
        .bind(event.new_status.map(|s| s.as_str()))
        .bind(&event.triggered_by)
        .bind(&event.description)
        .bind(event.visible_to_candidate)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<ApplicationEvent>> {
        // rowid breaks ties between events appended within the same millisecond
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT * FROM application_events
            WHERE application_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(EventRow::into_event).collect()
    }

    async fn exists(
        &self,
        application_id: &ApplicationId,
        event_type: ApplicationEventType,
        triggered_by: &UserId,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM application_events
            WHERE application_id = ? AND event_type = ? AND triggered_by = ?
            "#,
        )
        .bind(application_id)
        .bind(event_type.as_str())
        .bind(triggered_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(count > 0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    application_id: String,
    event_type: String,
    old_status: Option<String>,
    new_status: Option<String>,
    triggered_by: String,
    description: String,
    visible_to_candidate: bool,
    created_at: i64,
}

impl EventRow {
    fn into_event(self) -> Result<ApplicationEvent> {
        Ok(ApplicationEvent {
            id: self.id,
            application_id: self.application_id,
            event_type: self.event_type.parse()?,
            old_status: self.old_status.map(|s| s.parse()).transpose()?,
            new_status: self.new_status.map(|s| s.parse()).transpose()?,
            triggered_by: self.triggered_by,
            description: self.description,
            visible_to_candidate: self.visible_to_candidate,
            created_at: self.created_at,
        })
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event_log::{EventType, VehicleEventLog};
use crate::repositories::EventLogStore;
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct EventLogRow {
    id: Uuid,
    vehicle_id: Uuid,
    event_type: String,
    event_data: Option<serde_json::Value>,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<EventLogRow> for VehicleEventLog {
    type Error = AppError;

    fn try_from(row: EventLogRow) -> Result<Self, Self::Error> {
        let event_type = EventType::parse(&row.event_type)
            .ok_or_else(|| AppError::Internal(format!("Unknown event type '{}'", row.event_type)))?;
        Ok(VehicleEventLog {
            id: row.id,
            vehicle_id: row.vehicle_id,
            event_type,
            event_data: row.event_data,
            occurred_at: row.occurred_at,
        })
    }
}

pub struct PgEventLogRepository {
    pool: PgPool,
}

impl PgEventLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLogStore for PgEventLogRepository {
    async fn append(&self, event: &VehicleEventLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_event_log (id, vehicle_id, event_type, event_data, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id)
        .bind(event.vehicle_id)
        .bind(event.event_type.as_str())
        .bind(&event.event_data)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_recent(&self, vehicle_id: Uuid, limit: i64) -> AppResult<Vec<VehicleEventLog>> {
        let rows = sqlx::query_as::<_, EventLogRow>(
            r#"
            SELECT * FROM vehicle_event_log
            WHERE vehicle_id = $1
            ORDER BY occurred_at DESC
            LIMIT $2
            "#,
        )
        .bind(vehicle_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VehicleEventLog::try_from).collect()
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle_state::{DataSource, VehicleState};
use crate::repositories::VehicleStateStore;
use crate::utils::errors::{AppError, AppResult};

// Struct de fila para VehicleState (data_source viaja como TEXT)
#[derive(Debug, sqlx::FromRow)]
struct VehicleStateRow {
    vehicle_id: Uuid,
    latitude: Option<f64>,
    longitude: Option<f64>,
    battery_level: Option<i32>,
    is_charging: bool,
    speed_kmh: Option<f64>,
    odometer_km: f64,
    last_updated_at: DateTime<Utc>,
    data_source: String,
    message_sequence: Option<i64>,
}

impl TryFrom<VehicleStateRow> for VehicleState {
    type Error = AppError;

    fn try_from(row: VehicleStateRow) -> Result<Self, Self::Error> {
        let data_source = DataSource::parse(&row.data_source)
            .ok_or_else(|| AppError::Internal(format!("Unknown data source '{}'", row.data_source)))?;
        Ok(VehicleState {
            vehicle_id: row.vehicle_id,
            latitude: row.latitude,
            longitude: row.longitude,
            battery_level: row.battery_level,
            is_charging: row.is_charging,
            speed_kmh: row.speed_kmh,
            odometer_km: row.odometer_km,
            last_updated_at: row.last_updated_at,
            data_source,
            message_sequence: row.message_sequence,
        })
    }
}

pub struct PgVehicleStateRepository {
    pool: PgPool,
}

impl PgVehicleStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStateStore for PgVehicleStateRepository {
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<VehicleState>> {
        let row = sqlx::query_as::<_, VehicleStateRow>(
            "SELECT * FROM vehicle_state WHERE vehicle_id = $1",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VehicleState::try_from).transpose()
    }

    // Upsert atómico a nivel de fila: la escritura concurrente de dos
    // productores sobre el mismo vehículo resuelve en last-write-wins,
    // nunca en una fila parcialmente aplicada.
    async fn save(&self, state: &VehicleState) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicle_state
                (vehicle_id, latitude, longitude, battery_level, is_charging,
                 speed_kmh, odometer_km, last_updated_at, data_source, message_sequence)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (vehicle_id) DO UPDATE SET
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                battery_level = EXCLUDED.battery_level,
                is_charging = EXCLUDED.is_charging,
                speed_kmh = EXCLUDED.speed_kmh,
                odometer_km = EXCLUDED.odometer_km,
                last_updated_at = EXCLUDED.last_updated_at,
                data_source = EXCLUDED.data_source,
                message_sequence = EXCLUDED.message_sequence
            "#,
        )
        .bind(state.vehicle_id)
        .bind(state.latitude)
        .bind(state.longitude)
        .bind(state.battery_level)
        .bind(state.is_charging)
        .bind(state.speed_kmh)
        .bind(state.odometer_km)
        .bind(state.last_updated_at)
        .bind(state.data_source.as_str())
        .bind(state.message_sequence)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM vehicle_state WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

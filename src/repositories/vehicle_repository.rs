use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::VehicleRegistry;
use crate::utils::errors::{AppError, AppResult};

// Struct de fila para Vehicle (el status viaja como TEXT)
#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    plate_number: String,
    status: String,
    odometer_km: f64,
    is_virtual: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = AppError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let status = VehicleStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown vehicle status '{}'", row.status)))?;
        Ok(Vehicle {
            id: row.id,
            plate_number: row.plate_number,
            status,
            odometer_km: row.odometer_km,
            is_virtual: row.is_virtual,
            created_at: row.created_at,
        })
    }
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        plate_number: String,
        odometer_km: f64,
        is_virtual: bool,
    ) -> AppResult<Vehicle> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            INSERT INTO vehicles (id, plate_number, status, odometer_km, is_virtual, created_at)
            VALUES ($1, $2, 'AVAILABLE', $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(plate_number)
        .bind(odometer_km)
        .bind(is_virtual)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    pub async fn find_all(&self) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM vehicles ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    pub async fn plate_number_exists(&self, plate_number: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE plate_number = $1)")
                .bind(plate_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

}

#[async_trait]
impl VehicleRegistry for PgVehicleRepository {
    async fn find_by_id(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>("SELECT * FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Vehicle::try_from).transpose()
    }

    async fn list_virtual(&self) -> AppResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(
            "SELECT * FROM vehicles WHERE is_virtual = TRUE ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Vehicle::try_from).collect()
    }

    async fn set_odometer(&self, vehicle_id: Uuid, odometer_km: f64) -> AppResult<()> {
        sqlx::query("UPDATE vehicles SET odometer_km = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(odometer_km)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_status(&self, vehicle_id: Uuid, status: VehicleStatus) -> AppResult<()> {
        sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
            .bind(vehicle_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, vehicle_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

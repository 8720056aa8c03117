use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::event_log::{EventType, VehicleEventLog};
use crate::models::response::ApiResponse;
use crate::models::vehicle::{CreateVehicleRequest, VehicleResponse};
use crate::repositories::vehicle_repository::PgVehicleRepository;
use crate::repositories::VehicleRegistry;
use crate::services::EventLogService;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

pub struct VehicleController {
    repository: PgVehicleRepository,
    events: EventLogService,
}

impl VehicleController {
    pub fn new(pool: PgPool, events: EventLogService) -> Self {
        Self {
            repository: PgVehicleRepository::new(pool),
            events,
        }
    }

    pub async fn create(
        &self,
        request: CreateVehicleRequest,
    ) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        if request.plate_number.trim().is_empty() {
            return Err(AppError::BadRequest("La matrícula es requerida".to_string()));
        }

        if self.repository.plate_number_exists(&request.plate_number).await? {
            return Err(conflict_error("Vehicle", "plate_number", &request.plate_number));
        }

        let vehicle = self
            .repository
            .create(
                request.plate_number,
                request.odometer_km.unwrap_or(0.0),
                request.is_virtual.unwrap_or(true),
            )
            .await?;

        self.events.record(
            vehicle.id,
            EventType::VehicleCreated,
            Some(json!({ "plate_number": vehicle.plate_number })),
        );

        info!("Vehicle created: {} ({})", vehicle.plate_number, vehicle.id);
        Ok(ApiResponse::success_with_message(
            VehicleResponse::from(vehicle),
            "Vehículo creado exitosamente",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", id))?;

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self) -> AppResult<Vec<VehicleResponse>> {
        let vehicles = self.repository.find_all().await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn recent_events(
        &self,
        id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<VehicleEventLog>> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(not_found_error("Vehicle", id));
        }
        self.events.recent_events(id, limit).await
    }
}

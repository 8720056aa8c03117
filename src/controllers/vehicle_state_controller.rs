use std::sync::Arc;

use uuid::Uuid;

use crate::models::response::ApiResponse;
use crate::models::vehicle_state::{UpdateVehicleStateRequest, VehicleStateResponse};
use crate::services::VehicleStateService;
use crate::utils::errors::AppResult;

pub struct VehicleStateController {
    service: Arc<VehicleStateService>,
}

impl VehicleStateController {
    pub fn new(service: Arc<VehicleStateService>) -> Self {
        Self { service }
    }

    pub async fn get_state(&self, vehicle_id: Uuid) -> AppResult<VehicleStateResponse> {
        self.service.get_state(vehicle_id).await
    }

    pub async fn update_state(
        &self,
        vehicle_id: Uuid,
        request: UpdateVehicleStateRequest,
    ) -> AppResult<ApiResponse<VehicleStateResponse>> {
        let response = self.service.update_state(vehicle_id, request).await?;
        Ok(ApiResponse::success_with_message(
            response,
            "Estado del vehículo actualizado exitosamente",
        ))
    }
}

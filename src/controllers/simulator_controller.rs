use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::config::simulator::SimulatorSettings;
use crate::models::response::ApiResponse;
use crate::utils::errors::AppResult;

pub struct SimulatorController {
    settings: Arc<SimulatorSettings>,
}

impl SimulatorController {
    pub fn new(settings: Arc<SimulatorSettings>) -> Self {
        Self { settings }
    }

    pub async fn get_config(&self) -> AppResult<ApiResponse<Value>> {
        let vehicle_ids = self.settings.vehicle_ids().await;
        let vehicle_count = if vehicle_ids.is_empty() {
            json!("ALL")
        } else {
            json!(vehicle_ids.len())
        };

        let config = json!({
            "enabled": self.settings.is_enabled(),
            "update_interval_ms": self.settings.update_interval_ms(),
            "status_change_interval_ms": self.settings.status_change_interval_ms(),
            "vehicle_ids": vehicle_ids,
            "vehicle_count": vehicle_count,
        });

        Ok(ApiResponse::success_with_message(config, "Simulator config retrieved"))
    }

    pub fn enable(&self) -> ApiResponse<()> {
        self.settings.set_enabled(true);
        info!("Simulator ENABLED via API");
        ApiResponse::message_only("Simulator enabled successfully")
    }

    pub fn disable(&self) -> ApiResponse<()> {
        self.settings.set_enabled(false);
        info!("Simulator DISABLED via API");
        ApiResponse::message_only("Simulator disabled successfully")
    }

    pub async fn set_vehicles(&self, vehicle_ids: Vec<Uuid>) -> AppResult<ApiResponse<Value>> {
        info!("Setting simulator vehicle whitelist: {:?}", vehicle_ids);
        let message = if vehicle_ids.is_empty() {
            "Vehicle whitelist updated. Simulating ALL vehicles".to_string()
        } else {
            format!("Vehicle whitelist updated. Simulating {} vehicles", vehicle_ids.len())
        };
        self.settings.set_vehicle_ids(vehicle_ids).await;

        let ids = self.settings.vehicle_ids().await;
        let result = json!({
            "vehicle_ids": ids,
            "mode": if ids.is_empty() { "ALL_VEHICLES" } else { "WHITELIST" },
        });

        Ok(ApiResponse::success_with_message(result, message))
    }

    pub async fn add_vehicle(&self, vehicle_id: Uuid) -> AppResult<ApiResponse<Value>> {
        self.settings.add_vehicle(vehicle_id).await;
        info!("Added vehicle {} to simulator whitelist", vehicle_id);

        let result = json!({
            "vehicle_ids": self.settings.vehicle_ids().await,
            "added": vehicle_id,
        });

        Ok(ApiResponse::success_with_message(
            result,
            format!("Vehicle {} added to simulation", vehicle_id),
        ))
    }

    pub async fn remove_vehicle(&self, vehicle_id: Uuid) -> AppResult<ApiResponse<Value>> {
        self.settings.remove_vehicle(vehicle_id).await;
        info!("Removed vehicle {} from simulator whitelist", vehicle_id);

        let result = json!({
            "vehicle_ids": self.settings.vehicle_ids().await,
            "removed": vehicle_id,
        });

        Ok(ApiResponse::success_with_message(
            result,
            format!("Vehicle {} removed from simulation", vehicle_id),
        ))
    }
}

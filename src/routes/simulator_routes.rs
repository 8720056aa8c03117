use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;
use uuid::Uuid;

use crate::controllers::simulator_controller::SimulatorController;
use crate::models::response::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_simulator_router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config))
        .route("/enable", post(enable))
        .route("/disable", post(disable))
        .route("/vehicles", put(set_vehicles))
        .route("/vehicles/:vehicle_id", post(add_vehicle))
        .route("/vehicles/:vehicle_id", delete(remove_vehicle))
}

async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Ok(Json(controller.get_config().await?))
}

async fn enable(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Json(controller.enable())
}

async fn disable(State(state): State<AppState>) -> Json<ApiResponse<()>> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Json(controller.disable())
}

async fn set_vehicles(
    State(state): State<AppState>,
    Json(vehicle_ids): Json<Vec<Uuid>>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Ok(Json(controller.set_vehicles(vehicle_ids).await?))
}

async fn add_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Ok(Json(controller.add_vehicle(vehicle_id).await?))
}

async fn remove_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let controller = SimulatorController::new(state.simulator_settings.clone());
    Ok(Json(controller.remove_vehicle(vehicle_id).await?))
}

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::controllers::vehicle_state_controller::VehicleStateController;
use crate::models::event_log::VehicleEventLog;
use crate::models::response::ApiResponse;
use crate::models::vehicle::{CreateVehicleRequest, VehicleResponse};
use crate::models::vehicle_state::{UpdateVehicleStateRequest, VehicleStateResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle))
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route("/:id/state", get(get_vehicle_state))
        .route("/:id/state", put(update_vehicle_state))
        .route("/:id/events", get(get_vehicle_events))
}

fn vehicle_controller(state: &AppState) -> VehicleController {
    VehicleController::new(state.pool.clone(), state.state_service.events().clone())
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let response = vehicle_controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let response = vehicle_controller(&state).list().await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let response = vehicle_controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.state_service.delete_vehicle(id).await?;
    Ok(Json(ApiResponse::message_only("Vehículo eliminado exitosamente")))
}

async fn get_vehicle_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleStateResponse>, AppError> {
    let controller = VehicleStateController::new(state.state_service.clone());
    let response = controller.get_state(id).await?;
    Ok(Json(response))
}

async fn update_vehicle_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleStateRequest>,
) -> Result<Json<ApiResponse<VehicleStateResponse>>, AppError> {
    let controller = VehicleStateController::new(state.state_service.clone());
    let response = controller.update_state(id, request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    limit: Option<i64>,
}

async fn get_vehicle_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<VehicleEventLog>>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let response = vehicle_controller(&state).recent_events(id, limit).await?;
    Ok(Json(response))
}

//! Servicio de estado de vehículos
//!
//! Orquesta el ciclo read-modify-write por vehículo: lee el estado actual
//! (o el estado cero), delega el merge a la lógica pura de `state_merger`,
//! persiste el registro completo y registra el change set como evento.
//! Actualizaciones manuales y telemetría sintética pasan por el mismo camino.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::models::event_log::EventType;
use crate::models::vehicle::Vehicle;
use crate::models::vehicle_state::{
    UpdateVehicleStateRequest, VehicleState, VehicleStateResponse,
};
use crate::repositories::{VehicleRegistry, VehicleStateStore};
use crate::services::event_log_service::EventLogService;
use crate::services::state_merger;
use crate::utils::errors::{not_found_error, AppResult};

pub struct VehicleStateService {
    registry: Arc<dyn VehicleRegistry>,
    states: Arc<dyn VehicleStateStore>,
    events: EventLogService,
}

impl VehicleStateService {
    pub fn new(
        registry: Arc<dyn VehicleRegistry>,
        states: Arc<dyn VehicleStateStore>,
        events: EventLogService,
    ) -> Self {
        Self {
            registry,
            states,
            events,
        }
    }

    pub fn events(&self) -> &EventLogService {
        &self.events
    }

    /// Aplica una actualización parcial al estado de un vehículo.
    ///
    /// El estado se crea de forma perezosa si el vehículo aún no tiene uno.
    /// Un odómetro aceptado se propaga también al registro del vehículo.
    pub async fn update_state(
        &self,
        vehicle_id: Uuid,
        request: UpdateVehicleStateRequest,
    ) -> AppResult<VehicleStateResponse> {
        debug!("Updating state for vehicle {}", vehicle_id);
        request.validate()?;

        let mut vehicle = self
            .registry
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let current = self.current_or_initial(&vehicle).await?;
        let outcome = state_merger::apply_update(&current, &request, Utc::now())?;

        self.states.save(&outcome.state).await?;

        if let Some(odometer_km) = request.odometer_km {
            self.registry.set_odometer(vehicle_id, odometer_km).await?;
            vehicle.odometer_km = odometer_km;
        }

        if !outcome.changes.is_empty() {
            let mut payload = outcome.changes.to_json();
            payload["data_source"] = json!(outcome.state.data_source.as_str());
            if let Some(sequence) = outcome.state.message_sequence {
                payload["message_sequence"] = json!(sequence);
            }
            self.events
                .record(vehicle_id, EventType::StateUpdated, Some(payload));
        }

        info!("Vehicle state updated successfully for vehicle {}", vehicle_id);
        Ok(VehicleStateResponse::from_parts(&vehicle, &outcome.state))
    }

    /// Estado actual de un vehículo; 404 si el vehículo o su estado no existen
    pub async fn get_state(&self, vehicle_id: Uuid) -> AppResult<VehicleStateResponse> {
        let vehicle = self
            .registry
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        let state = self
            .states
            .find_by_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("VehicleState", vehicle_id))?;

        Ok(VehicleStateResponse::from_parts(&vehicle, &state))
    }

    /// Elimina un vehículo junto con su registro de estado.
    ///
    /// El evento de borrado se registra recién cuando ambas eliminaciones
    /// se completaron; un borrado fallido no deja rastro en el log.
    pub async fn delete_vehicle(&self, vehicle_id: Uuid) -> AppResult<()> {
        let vehicle = self
            .registry
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", vehicle_id))?;

        // El estado muere con su vehículo
        self.states.delete_by_vehicle(vehicle_id).await?;
        self.registry.delete(vehicle_id).await?;

        self.events.record(
            vehicle_id,
            EventType::VehicleDeleted,
            Some(json!({ "plate_number": vehicle.plate_number })),
        );

        info!("Vehicle deleted successfully: {}", vehicle_id);
        Ok(())
    }

    /// Estado persistido o estado cero sin persistir (ver `VehicleState::initial`)
    pub async fn current_or_initial(&self, vehicle: &Vehicle) -> AppResult<VehicleState> {
        let current = self.states.find_by_vehicle(vehicle.id).await?;
        Ok(current.unwrap_or_else(|| VehicleState::initial(vehicle, Utc::now())))
    }
}

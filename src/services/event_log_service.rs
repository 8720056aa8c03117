//! Servicio de registro de eventos de vehículos
//!
//! Canal lateral best-effort: el append se despacha en una tarea aparte y
//! los errores se registran en el log sin propagarse jamás al llamador.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::event_log::{EventType, VehicleEventLog};
use crate::repositories::EventLogStore;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct EventLogService {
    store: Arc<dyn EventLogStore>,
}

impl EventLogService {
    pub fn new(store: Arc<dyn EventLogStore>) -> Self {
        Self { store }
    }

    /// Registra un evento sin bloquear ni fallar al llamador
    pub fn record(
        &self,
        vehicle_id: Uuid,
        event_type: EventType,
        event_data: Option<serde_json::Value>,
    ) {
        let store = Arc::clone(&self.store);
        let event = VehicleEventLog {
            id: Uuid::new_v4(),
            vehicle_id,
            event_type,
            event_data,
            occurred_at: Utc::now(),
        };

        tokio::spawn(async move {
            match store.append(&event).await {
                Ok(()) => {
                    debug!(
                        "Logged event {} for vehicle {}",
                        event.event_type.as_str(),
                        event.vehicle_id
                    );
                }
                Err(e) => {
                    error!(
                        "Failed to log event {} for vehicle {}: {}",
                        event.event_type.as_str(),
                        event.vehicle_id,
                        e
                    );
                }
            }
        });
    }

    /// Eventos recientes de un vehículo, del más nuevo al más viejo
    pub async fn recent_events(
        &self,
        vehicle_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<VehicleEventLog>> {
        self.store.find_recent(vehicle_id, limit).await
    }
}

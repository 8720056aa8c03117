//! Modelo del log de eventos de vehículos
//!
//! Registro append-only de cambios relevantes. La escritura es best-effort:
//! un fallo al registrar un evento nunca rompe el flujo principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tipo de evento registrado en vehicle_event_log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    VehicleCreated,
    VehicleDeleted,
    StateUpdated,
    StatusChanged,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::VehicleCreated => "VEHICLE_CREATED",
            EventType::VehicleDeleted => "VEHICLE_DELETED",
            EventType::StateUpdated => "STATE_UPDATED",
            EventType::StatusChanged => "STATUS_CHANGED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VEHICLE_CREATED" => Some(EventType::VehicleCreated),
            "VEHICLE_DELETED" => Some(EventType::VehicleDeleted),
            "STATE_UPDATED" => Some(EventType::StateUpdated),
            "STATUS_CHANGED" => Some(EventType::StatusChanged),
            _ => None,
        }
    }
}

/// Evento de vehículo - mapea a la tabla vehicle_event_log
#[derive(Debug, Clone, Serialize)]
pub struct VehicleEventLog {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub event_type: EventType,
    pub event_data: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD operations.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Estado operacional del vehículo
///
/// `Maintenance` y `Damaged` son estados terminales para el simulador:
/// solo se modifican mediante operaciones manuales externas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    Damaged,
    Charging,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::InUse => "IN_USE",
            VehicleStatus::Maintenance => "MAINTENANCE",
            VehicleStatus::Damaged => "DAMAGED",
            VehicleStatus::Charging => "CHARGING",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AVAILABLE" => Some(VehicleStatus::Available),
            "IN_USE" => Some(VehicleStatus::InUse),
            "MAINTENANCE" => Some(VehicleStatus::Maintenance),
            "DAMAGED" => Some(VehicleStatus::Damaged),
            "CHARGING" => Some(VehicleStatus::Charging),
            _ => None,
        }
    }
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    pub status: VehicleStatus,
    pub odometer_km: f64,
    pub is_virtual: bool,
    pub created_at: DateTime<Utc>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 5, max = 20))]
    pub plate_number: String,

    #[validate(range(min = 0.0))]
    pub odometer_km: Option<f64>,

    pub is_virtual: Option<bool>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: String,
    pub plate_number: String,
    pub status: VehicleStatus,
    pub odometer_km: f64,
    pub is_virtual: bool,
    pub created_at: String,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id.to_string(),
            plate_number: vehicle.plate_number,
            status: vehicle.status,
            odometer_km: vehicle.odometer_km,
            is_virtual: vehicle.is_virtual,
            created_at: vehicle.created_at.to_rfc3339(),
        }
    }
}

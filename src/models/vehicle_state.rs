//! Modelo de VehicleState
//!
//! Estado actual en tiempo real de un vehículo (GPS, batería, velocidad,
//! odómetro). Existe como máximo un registro por vehículo y se crea de forma
//! perezosa en la primera actualización.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::Vehicle;

/// Origen de los datos de telemetría
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSource {
    /// Editado manualmente por un operador
    Manual,
    /// Generado por el simulador de vehículos virtuales
    VirtualCar,
    /// Generado o calculado por el sistema
    System,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Manual => "MANUAL",
            DataSource::VirtualCar => "VIRTUAL_CAR",
            DataSource::System => "SYSTEM",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MANUAL" => Some(DataSource::Manual),
            "VIRTUAL_CAR" => Some(DataSource::VirtualCar),
            "SYSTEM" => Some(DataSource::System),
            _ => None,
        }
    }

    /// Solo las fuentes externas genuinas exigen secuencias estrictamente
    /// crecientes. MANUAL y VIRTUAL_CAR pueden reiniciar su numeración
    /// (por ejemplo tras un reinicio del proceso).
    pub fn is_ordered(&self) -> bool {
        !matches!(self, DataSource::Manual | DataSource::VirtualCar)
    }
}

/// Estado actual de un vehículo - mapea a la tabla vehicle_state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleState {
    pub vehicle_id: Uuid,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_level: Option<i32>,
    pub is_charging: bool,
    pub speed_kmh: Option<f64>,
    pub odometer_km: f64,
    pub last_updated_at: DateTime<Utc>,
    pub data_source: DataSource,
    pub message_sequence: Option<i64>,
}

impl VehicleState {
    /// Estado cero para un vehículo sin registro: batería llena, velocidad
    /// cero y odómetro copiado del registro del vehículo. No se persiste
    /// hasta el primer merge aceptado.
    pub fn initial(vehicle: &Vehicle, now: DateTime<Utc>) -> Self {
        Self {
            vehicle_id: vehicle.id,
            latitude: None,
            longitude: None,
            battery_level: Some(100),
            is_charging: false,
            speed_kmh: Some(0.0),
            odometer_km: vehicle.odometer_km,
            last_updated_at: now,
            data_source: DataSource::System,
            message_sequence: Some(0),
        }
    }
}

/// Request para actualizar el estado de un vehículo (GPS, batería, velocidad)
///
/// Semántica de actualización parcial: los campos ausentes no se tocan,
/// ningún campo se limpia por omisión.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVehicleStateRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[validate(range(min = 0, max = 100))]
    pub battery_level: Option<i32>,

    pub is_charging: Option<bool>,

    #[validate(range(min = 0.0, max = 200.0))]
    pub speed_kmh: Option<f64>,

    #[validate(range(min = 0.0))]
    pub odometer_km: Option<f64>,

    pub data_source: Option<DataSource>,

    #[validate(range(min = 0))]
    pub message_sequence: Option<i64>,
}

/// Response de estado de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleStateResponse {
    pub vehicle_id: String,
    pub plate_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub battery_level: Option<i32>,
    pub is_charging: bool,
    pub speed_kmh: Option<f64>,
    pub odometer_km: f64,
    pub last_updated_at: String,
    pub data_source: DataSource,
    pub message_sequence: Option<i64>,
}

impl VehicleStateResponse {
    pub fn from_parts(vehicle: &Vehicle, state: &VehicleState) -> Self {
        Self {
            vehicle_id: vehicle.id.to_string(),
            plate_number: vehicle.plate_number.clone(),
            latitude: state.latitude,
            longitude: state.longitude,
            battery_level: state.battery_level,
            is_charging: state.is_charging,
            speed_kmh: state.speed_kmh,
            odometer_km: state.odometer_km,
            last_updated_at: state.last_updated_at.to_rfc3339(),
            data_source: state.data_source,
            message_sequence: state.message_sequence,
        }
    }
}

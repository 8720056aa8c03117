//! Repositorios de persistencia
//!
//! Este módulo define los contratos que el núcleo de sincronización necesita
//! de sus colaboradores (registro de vehículos, almacén de estados y sink de
//! eventos) junto con las implementaciones PostgreSQL y en memoria.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::event_log::VehicleEventLog;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::models::vehicle_state::VehicleState;
use crate::utils::errors::AppResult;

pub mod event_log_repository;
pub mod memory;
pub mod vehicle_repository;
pub mod vehicle_state_repository;

/// Acceso a los registros de vehículos que consume el motor de sincronización
#[async_trait]
pub trait VehicleRegistry: Send + Sync {
    async fn find_by_id(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Todos los vehículos virtuales elegibles para simulación
    async fn list_virtual(&self) -> AppResult<Vec<Vehicle>>;

    /// Propaga el odómetro aceptado al registro del vehículo
    async fn set_odometer(&self, vehicle_id: Uuid, odometer_km: f64) -> AppResult<()>;

    async fn set_status(&self, vehicle_id: Uuid, status: VehicleStatus) -> AppResult<()>;

    async fn delete(&self, vehicle_id: Uuid) -> AppResult<()>;
}

/// Almacén del registro de estado actual, uno por vehículo
///
/// `save` escribe siempre el registro completo (upsert atómico por fila,
/// last-write-wins). No se exponen escrituras parciales.
#[async_trait]
pub trait VehicleStateStore: Send + Sync {
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<VehicleState>>;

    async fn save(&self, state: &VehicleState) -> AppResult<()>;

    /// El estado muere con su vehículo
    async fn delete_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<()>;
}

/// Sink append-only de eventos de cambio
#[async_trait]
pub trait EventLogStore: Send + Sync {
    async fn append(&self, event: &VehicleEventLog) -> AppResult<()>;

    async fn find_recent(&self, vehicle_id: Uuid, limit: i64) -> AppResult<Vec<VehicleEventLog>>;
}

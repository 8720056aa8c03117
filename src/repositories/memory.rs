//! Implementaciones en memoria de los colaboradores de persistencia
//!
//! Se usan en los tests de integración y en modo demo sin base de datos.
//! Respetan el mismo contrato que las implementaciones PostgreSQL: la
//! escritura de estado es un reemplazo completo del registro por vehículo.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::event_log::VehicleEventLog;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::models::vehicle_state::VehicleState;
use crate::repositories::{EventLogStore, VehicleRegistry, VehicleStateStore};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryVehicleRegistry {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
}

impl InMemoryVehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, vehicle: Vehicle) {
        self.vehicles.write().await.insert(vehicle.id, vehicle);
    }
}

#[async_trait]
impl VehicleRegistry for InMemoryVehicleRegistry {
    async fn find_by_id(&self, vehicle_id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.vehicles.read().await.get(&vehicle_id).cloned())
    }

    async fn list_virtual(&self) -> AppResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .read()
            .await
            .values()
            .filter(|v| v.is_virtual)
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.created_at);
        Ok(vehicles)
    }

    async fn set_odometer(&self, vehicle_id: Uuid, odometer_km: f64) -> AppResult<()> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| AppError::NotFound(format!("Vehicle with id '{}' not found", vehicle_id)))?;
        vehicle.odometer_km = odometer_km;
        Ok(())
    }

    async fn set_status(&self, vehicle_id: Uuid, status: VehicleStatus) -> AppResult<()> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles
            .get_mut(&vehicle_id)
            .ok_or_else(|| AppError::NotFound(format!("Vehicle with id '{}' not found", vehicle_id)))?;
        vehicle.status = status;
        Ok(())
    }

    async fn delete(&self, vehicle_id: Uuid) -> AppResult<()> {
        self.vehicles.write().await.remove(&vehicle_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<Uuid, VehicleState>>,
    // Ids de vehículos cuyos saves/deletes deben fallar (inyección de fallos en tests)
    failing: RwLock<HashSet<Uuid>>,
    failing_deletes: RwLock<HashSet<Uuid>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hace fallar todos los `save` del vehículo indicado
    pub async fn fail_saves_for(&self, vehicle_id: Uuid) {
        self.failing.write().await.insert(vehicle_id);
    }

    /// Hace fallar todos los `delete_by_vehicle` del vehículo indicado
    pub async fn fail_deletes_for(&self, vehicle_id: Uuid) {
        self.failing_deletes.write().await.insert(vehicle_id);
    }
}

#[async_trait]
impl VehicleStateStore for InMemoryStateStore {
    async fn find_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<Option<VehicleState>> {
        Ok(self.states.read().await.get(&vehicle_id).cloned())
    }

    async fn save(&self, state: &VehicleState) -> AppResult<()> {
        if self.failing.read().await.contains(&state.vehicle_id) {
            return Err(AppError::Internal(format!(
                "Injected save failure for vehicle {}",
                state.vehicle_id
            )));
        }
        self.states
            .write()
            .await
            .insert(state.vehicle_id, state.clone());
        Ok(())
    }

    async fn delete_by_vehicle(&self, vehicle_id: Uuid) -> AppResult<()> {
        if self.failing_deletes.read().await.contains(&vehicle_id) {
            return Err(AppError::Internal(format!(
                "Injected delete failure for vehicle {}",
                vehicle_id
            )));
        }
        self.states.write().await.remove(&vehicle_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEventLog {
    events: RwLock<Vec<VehicleEventLog>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Vec<VehicleEventLog> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventLogStore for InMemoryEventLog {
    async fn append(&self, event: &VehicleEventLog) -> AppResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn find_recent(&self, vehicle_id: Uuid, limit: i64) -> AppResult<Vec<VehicleEventLog>> {
        let events = self.events.read().await;
        let mut recent: Vec<VehicleEventLog> = events
            .iter()
            .filter(|e| e.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        recent.truncate(limit.max(0) as usize);
        Ok(recent)
    }
}

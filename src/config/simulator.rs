//! Configuración del simulador de vehículos virtuales
//!
//! Ajustes mutables en runtime a través de la API de control: interruptor
//! global y lista blanca de vehículos (vacía = simular todos los virtuales).
//! Los intervalos se fijan al arrancar el proceso.

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

pub struct SimulatorSettings {
    enabled: AtomicBool,
    update_interval_ms: u64,
    status_change_interval_ms: u64,
    vehicle_ids: RwLock<HashSet<Uuid>>,
}

impl SimulatorSettings {
    pub fn new(
        enabled: bool,
        update_interval_ms: u64,
        status_change_interval_ms: u64,
        vehicle_ids: HashSet<Uuid>,
    ) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            update_interval_ms,
            status_change_interval_ms,
            vehicle_ids: RwLock::new(vehicle_ids),
        }
    }

    /// Lee la configuración del entorno con los defaults del servicio:
    /// habilitado, telemetría cada 5s, cambios de estado cada 30s, sin filtro.
    pub fn from_env() -> Self {
        let enabled = env::var("SIMULATOR_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        let update_interval_ms = env::var("SIMULATOR_UPDATE_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);
        let status_change_interval_ms = env::var("SIMULATOR_STATUS_CHANGE_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);
        let vehicle_ids = env::var("SIMULATOR_VEHICLE_IDS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|s| Uuid::parse_str(s.trim()).ok())
                    .collect()
            })
            .unwrap_or_default();

        Self::new(enabled, update_interval_ms, status_change_interval_ms, vehicle_ids)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn update_interval_ms(&self) -> u64 {
        self.update_interval_ms
    }

    pub fn status_change_interval(&self) -> Duration {
        Duration::from_millis(self.status_change_interval_ms)
    }

    pub fn status_change_interval_ms(&self) -> u64 {
        self.status_change_interval_ms
    }

    /// Un vehículo se simula si el simulador está habilitado y además
    /// la lista blanca está vacía o lo contiene.
    pub async fn should_simulate(&self, vehicle_id: Uuid) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let ids = self.vehicle_ids.read().await;
        ids.is_empty() || ids.contains(&vehicle_id)
    }

    pub async fn vehicle_ids(&self) -> Vec<Uuid> {
        self.vehicle_ids.read().await.iter().copied().collect()
    }

    pub async fn set_vehicle_ids(&self, ids: Vec<Uuid>) {
        *self.vehicle_ids.write().await = ids.into_iter().collect();
    }

    pub async fn add_vehicle(&self, vehicle_id: Uuid) {
        self.vehicle_ids.write().await.insert(vehicle_id);
    }

    pub async fn remove_vehicle(&self, vehicle_id: Uuid) {
        self.vehicle_ids.write().await.remove(&vehicle_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_allow_list_simulates_all() {
        let settings = SimulatorSettings::new(true, 5000, 30_000, HashSet::new());
        assert!(settings.should_simulate(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn allow_list_restricts_simulation() {
        let allowed = Uuid::new_v4();
        let settings = SimulatorSettings::new(true, 5000, 30_000, HashSet::from([allowed]));
        assert!(settings.should_simulate(allowed).await);
        assert!(!settings.should_simulate(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn disabled_simulator_skips_everything() {
        let settings = SimulatorSettings::new(false, 5000, 30_000, HashSet::new());
        assert!(!settings.should_simulate(Uuid::new_v4()).await);

        settings.set_enabled(true);
        assert!(settings.should_simulate(Uuid::new_v4()).await);
    }
}

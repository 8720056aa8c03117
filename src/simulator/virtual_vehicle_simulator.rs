//! Simulador de vehículos virtuales - simula movimiento en tiempo real
//!
//! Dos tareas periódicas independientes: el tick de telemetría regenera GPS,
//! batería, velocidad y odómetro de cada vehículo virtual elegible; el tick
//! de estado avanza probabilísticamente su estado operacional. Toda lectura
//! generada pasa por el mismo camino de merge que una actualización manual.
//!
//! IMPORTANTE: esto existe para testing/demo. En producción los vehículos
//! reales enviarían su telemetría por una cola de mensajes.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use rand::{thread_rng, Rng};
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::simulator::SimulatorSettings;
use crate::models::event_log::EventType;
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::models::vehicle_state::{DataSource, UpdateVehicleStateRequest, VehicleState};
use crate::repositories::VehicleRegistry;
use crate::services::VehicleStateService;
use crate::simulator::status_machine::{next_status, STATUS_CHANGE_PROBABILITY};
use crate::utils::errors::AppResult;

// Parámetros de movimiento
const LATITUDE_STEP: f64 = 0.001; // ~111 metros por paso
const LONGITUDE_STEP: f64 = 0.001; // ~111 metros por paso
const MIN_SPEED_KMH: f64 = 20.0;
const MAX_SPEED_KMH: f64 = 80.0;
const BATTERY_DRAIN_RATE: f64 = 0.5; // % por tick en movimiento
const CHARGING_RATE: i32 = 2; // % por tick cargando

// Área de servicio (aprox. Ho Chi Minh City)
const MIN_LATITUDE: f64 = 10.6;
const MAX_LATITUDE: f64 = 10.9;
const MIN_LONGITUDE: f64 = 106.5;
const MAX_LONGITUDE: f64 = 106.9;
const DEFAULT_LATITUDE: f64 = 10.762622;
const DEFAULT_LONGITUDE: f64 = 106.660172;

// Un tick de telemetría cubre 5 segundos: km recorridos = velocidad / 720
const ODOMETER_DIVISOR: f64 = 720.0;

/// Telemetría de un vehículo en uso: desplazamiento aleatorio acotado,
/// velocidad uniforme en [20, 80], drenaje de batería proporcional y
/// avance de odómetro de exactamente `speed / 720` km.
pub fn moving_telemetry(
    state: &VehicleState,
    rng: &mut impl Rng,
) -> UpdateVehicleStateRequest {
    let lat_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let lon_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let lat_change = lat_sign * LATITUDE_STEP * rng.gen::<f64>();
    let lon_change = lon_sign * LONGITUDE_STEP * rng.gen::<f64>();

    let new_lat = (state.latitude.unwrap_or(DEFAULT_LATITUDE) + lat_change)
        .clamp(MIN_LATITUDE, MAX_LATITUDE);
    let new_lon = (state.longitude.unwrap_or(DEFAULT_LONGITUDE) + lon_change)
        .clamp(MIN_LONGITUDE, MAX_LONGITUDE);

    let speed = MIN_SPEED_KMH + rng.gen::<f64>() * (MAX_SPEED_KMH - MIN_SPEED_KMH);

    let current_battery = state.battery_level.unwrap_or(100);
    let drain = BATTERY_DRAIN_RATE * (speed / MAX_SPEED_KMH);
    let new_battery = ((current_battery as f64 - drain).floor() as i32).max(0);

    let odometer_increase = speed / ODOMETER_DIVISOR;

    UpdateVehicleStateRequest {
        latitude: Some(new_lat),
        longitude: Some(new_lon),
        speed_kmh: Some(speed),
        battery_level: Some(new_battery),
        is_charging: Some(false),
        odometer_km: Some(state.odometer_km + odometer_increase),
        ..Default::default()
    }
}

/// Telemetría de un vehículo cargando: posición fija, velocidad cero,
/// batería +2 puntos con tope en 100, odómetro intacto.
pub fn charging_telemetry(state: &VehicleState) -> UpdateVehicleStateRequest {
    let current_battery = state.battery_level.unwrap_or(0);
    let new_battery = (current_battery + CHARGING_RATE).min(100);

    UpdateVehicleStateRequest {
        latitude: state.latitude,
        longitude: state.longitude,
        speed_kmh: Some(0.0),
        battery_level: Some(new_battery),
        is_charging: Some(true),
        odometer_km: Some(state.odometer_km),
        ..Default::default()
    }
}

/// Telemetría de un vehículo estacionado: drenaje standby de 0 o 1 punto
pub fn parked_telemetry(
    state: &VehicleState,
    rng: &mut impl Rng,
) -> UpdateVehicleStateRequest {
    let current_battery = state.battery_level.unwrap_or(100);
    let new_battery = (current_battery - rng.gen_range(0..2)).max(0);

    UpdateVehicleStateRequest {
        latitude: state.latitude,
        longitude: state.longitude,
        speed_kmh: Some(0.0),
        battery_level: Some(new_battery),
        is_charging: Some(false),
        odometer_km: Some(state.odometer_km),
        ..Default::default()
    }
}

pub struct VirtualVehicleSimulator {
    registry: Arc<dyn VehicleRegistry>,
    state_service: Arc<VehicleStateService>,
    settings: Arc<SimulatorSettings>,
    // Contador de secuencia compartido por todas las invocaciones de tick
    message_sequence: AtomicI64,
}

impl VirtualVehicleSimulator {
    pub fn new(
        registry: Arc<dyn VehicleRegistry>,
        state_service: Arc<VehicleStateService>,
        settings: Arc<SimulatorSettings>,
    ) -> Self {
        Self {
            registry,
            state_service,
            settings,
            message_sequence: AtomicI64::new(1),
        }
    }

    /// Arranca las dos tareas periódicas. El apagado del proceso simplemente
    /// deja de agendar ticks; los que estén en vuelo terminan solos.
    pub fn spawn(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let telemetry = {
            let simulator = Arc::clone(self);
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(simulator.settings.update_interval());
                loop {
                    interval.tick().await;
                    if !simulator.settings.is_enabled() {
                        continue;
                    }
                    simulator.run_telemetry_tick().await;
                }
            })
        };

        let status = {
            let simulator = Arc::clone(self);
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval(simulator.settings.status_change_interval());
                loop {
                    interval.tick().await;
                    if !simulator.settings.is_enabled() {
                        continue;
                    }
                    simulator.run_status_tick().await;
                }
            })
        };

        vec![telemetry, status]
    }

    /// Un tick de telemetría: regenera el estado de todos los vehículos
    /// virtuales elegibles. El fallo de un vehículo no detiene el tick.
    pub async fn run_telemetry_tick(&self) {
        let vehicles = match self.eligible_vehicles().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!("Error in vehicle simulation loop: {}", e);
                return;
            }
        };

        if vehicles.is_empty() {
            return;
        }
        debug!("Simulating {} virtual vehicles...", vehicles.len());

        for vehicle in vehicles {
            if let Err(e) = self.simulate_vehicle(&vehicle).await {
                error!("Error simulating vehicle {}: {}", vehicle.id, e);
            }
        }
    }

    /// Un tick de estado: evalúa la máquina de estados por vehículo elegible,
    /// con probabilidad fija por vehículo, y aplica a lo sumo una transición.
    pub async fn run_status_tick(&self) {
        let vehicles = match self.eligible_vehicles().await {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!("Error in random status change: {}", e);
                return;
            }
        };

        for vehicle in vehicles {
            let roll = { thread_rng().gen_range(0..100) };
            if roll >= STATUS_CHANGE_PROBABILITY {
                continue;
            }
            if let Err(e) = self.change_vehicle_status(&vehicle).await {
                error!("Error changing status for vehicle {}: {}", vehicle.id, e);
            }
        }
    }

    async fn eligible_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        let virtual_vehicles = self.registry.list_virtual().await?;
        let mut eligible = Vec::with_capacity(virtual_vehicles.len());
        for vehicle in virtual_vehicles {
            if self.settings.should_simulate(vehicle.id).await {
                eligible.push(vehicle);
            }
        }
        Ok(eligible)
    }

    async fn simulate_vehicle(&self, vehicle: &Vehicle) -> AppResult<()> {
        let state = self.state_service.current_or_initial(vehicle).await?;

        let mut request = match vehicle.status {
            VehicleStatus::InUse => {
                let mut rng = thread_rng();
                moving_telemetry(&state, &mut rng)
            }
            VehicleStatus::Charging => charging_telemetry(&state),
            VehicleStatus::Available => {
                let mut rng = thread_rng();
                parked_telemetry(&state, &mut rng)
            }
            // Estos estados no se simulan
            VehicleStatus::Maintenance | VehicleStatus::Damaged => return Ok(()),
        };

        request.data_source = Some(DataSource::VirtualCar);
        request.message_sequence = Some(self.message_sequence.fetch_add(1, Ordering::SeqCst));

        self.state_service.update_state(vehicle.id, request).await?;
        Ok(())
    }

    async fn change_vehicle_status(&self, vehicle: &Vehicle) -> AppResult<()> {
        let state = self.state_service.current_or_initial(vehicle).await?;
        let battery = state.battery_level.unwrap_or(100);

        let new_status = {
            let mut rng = thread_rng();
            next_status(vehicle.status, battery, &mut rng)
        };

        if let Some(status) = new_status {
            self.registry.set_status(vehicle.id, status).await?;
            match (vehicle.status, status) {
                (VehicleStatus::Available, VehicleStatus::InUse) => {
                    info!("🚗 Vehicle {} rented! Status: AVAILABLE → IN_USE", vehicle.plate_number);
                }
                (VehicleStatus::InUse, VehicleStatus::Available) => {
                    info!("✅ Vehicle {} returned! Status: IN_USE → AVAILABLE", vehicle.plate_number);
                }
                (VehicleStatus::InUse, VehicleStatus::Charging) => {
                    info!("🔌 Vehicle {} needs charging! Status: IN_USE → CHARGING", vehicle.plate_number);
                }
                (VehicleStatus::Charging, VehicleStatus::Available) => {
                    info!("⚡ Vehicle {} fully charged! Status: CHARGING → AVAILABLE", vehicle.plate_number);
                }
                _ => {}
            }

            self.state_service.events().record(
                vehicle.id,
                EventType::StatusChanged,
                Some(json!({
                    "plate_number": vehicle.plate_number,
                    "old_status": vehicle.status.as_str(),
                    "new_status": status.as_str(),
                })),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn state_with(battery: Option<i32>, lat: Option<f64>, lon: Option<f64>) -> VehicleState {
        VehicleState {
            vehicle_id: Uuid::new_v4(),
            latitude: lat,
            longitude: lon,
            battery_level: battery,
            is_charging: false,
            speed_kmh: Some(0.0),
            odometer_km: 500.0,
            last_updated_at: Utc::now(),
            data_source: DataSource::System,
            message_sequence: Some(0),
        }
    }

    #[test]
    fn moving_telemetry_stays_inside_bounding_box() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            // Posición pegada al borde del área de servicio
            let state = state_with(Some(50), Some(MAX_LATITUDE), Some(MIN_LONGITUDE));
            let request = moving_telemetry(&state, &mut rng);

            let lat = request.latitude.unwrap();
            let lon = request.longitude.unwrap();
            assert!((MIN_LATITUDE..=MAX_LATITUDE).contains(&lat));
            assert!((MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon));
        }
    }

    #[test]
    fn moving_telemetry_advances_odometer_by_speed_over_720() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = state_with(Some(50), None, None);
        let request = moving_telemetry(&state, &mut rng);

        let speed = request.speed_kmh.unwrap();
        assert!((MIN_SPEED_KMH..=MAX_SPEED_KMH).contains(&speed));
        let expected = state.odometer_km + speed / 720.0;
        assert!((request.odometer_km.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn moving_telemetry_never_produces_negative_battery() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = state_with(Some(0), None, None);
            let request = moving_telemetry(&state, &mut rng);
            assert_eq!(request.battery_level, Some(0));
            assert_eq!(request.is_charging, Some(false));
        }
    }

    #[test]
    fn moving_telemetry_defaults_position_to_service_area() {
        let mut rng = StdRng::seed_from_u64(3);
        let state = state_with(Some(50), None, None);
        let request = moving_telemetry(&state, &mut rng);

        assert!((request.latitude.unwrap() - DEFAULT_LATITUDE).abs() <= LATITUDE_STEP);
        assert!((request.longitude.unwrap() - DEFAULT_LONGITUDE).abs() <= LONGITUDE_STEP);
    }

    #[test]
    fn charging_telemetry_holds_position_and_gains_two_points() {
        let state = state_with(Some(15), Some(10.7), Some(106.6));
        let request = charging_telemetry(&state);

        assert_eq!(request.battery_level, Some(17));
        assert_eq!(request.is_charging, Some(true));
        assert_eq!(request.latitude, Some(10.7));
        assert_eq!(request.longitude, Some(106.6));
        assert_eq!(request.speed_kmh, Some(0.0));
        assert_eq!(request.odometer_km, Some(500.0));
    }

    #[test]
    fn charging_telemetry_clamps_battery_at_hundred() {
        let state = state_with(Some(99), None, None);
        assert_eq!(charging_telemetry(&state).battery_level, Some(100));

        let full = state_with(Some(100), None, None);
        assert_eq!(charging_telemetry(&full).battery_level, Some(100));
    }

    #[test]
    fn parked_telemetry_drains_at_most_one_point() {
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = state_with(Some(40), Some(10.7), Some(106.6));
            let request = parked_telemetry(&state, &mut rng);

            let battery = request.battery_level.unwrap();
            assert!((39..=40).contains(&battery));
            assert_eq!(request.speed_kmh, Some(0.0));
            assert_eq!(request.latitude, Some(10.7));
            assert_eq!(request.odometer_km, Some(500.0));
        }
    }

    #[test]
    fn parked_telemetry_clamps_battery_at_zero() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = state_with(Some(0), None, None);
            assert_eq!(parked_telemetry(&state, &mut rng).battery_level, Some(0));
        }
    }
}

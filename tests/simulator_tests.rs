//! Tests de integración del simulador de vehículos virtuales
//!
//! Ejecutan ticks de telemetría y de estado contra los colaboradores en
//! memoria, verificando los invariantes físicos y la máquina de estados.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use fleet_management::config::simulator::SimulatorSettings;
use fleet_management::models::event_log::EventType;
use fleet_management::models::vehicle::{Vehicle, VehicleStatus};
use fleet_management::models::vehicle_state::{DataSource, UpdateVehicleStateRequest};
use fleet_management::repositories::memory::{
    InMemoryEventLog, InMemoryStateStore, InMemoryVehicleRegistry,
};
use fleet_management::repositories::{EventLogStore, VehicleRegistry, VehicleStateStore};
use fleet_management::services::{EventLogService, VehicleStateService};
use fleet_management::simulator::VirtualVehicleSimulator;

struct SimEnv {
    registry: Arc<InMemoryVehicleRegistry>,
    states: Arc<InMemoryStateStore>,
    events: Arc<InMemoryEventLog>,
    service: Arc<VehicleStateService>,
    simulator: Arc<VirtualVehicleSimulator>,
    settings: Arc<SimulatorSettings>,
}

fn build_sim_env(settings: SimulatorSettings) -> SimEnv {
    let registry = Arc::new(InMemoryVehicleRegistry::new());
    let states = Arc::new(InMemoryStateStore::new());
    let events = Arc::new(InMemoryEventLog::new());

    let registry_dyn: Arc<dyn VehicleRegistry> = registry.clone();
    let states_dyn: Arc<dyn VehicleStateStore> = states.clone();
    let events_dyn: Arc<dyn EventLogStore> = events.clone();

    let service = Arc::new(VehicleStateService::new(
        registry_dyn.clone(),
        states_dyn,
        EventLogService::new(events_dyn),
    ));

    let settings = Arc::new(settings);
    let simulator = Arc::new(VirtualVehicleSimulator::new(
        registry_dyn,
        Arc::clone(&service),
        Arc::clone(&settings),
    ));

    SimEnv {
        registry,
        states,
        events,
        service,
        simulator,
        settings,
    }
}

fn default_settings() -> SimulatorSettings {
    SimulatorSettings::new(true, 5000, 30_000, HashSet::new())
}

async fn add_vehicle(env: &SimEnv, status: VehicleStatus, is_virtual: bool) -> Uuid {
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        plate_number: format!("51V-{:05}", rand::random::<u16>()),
        status,
        odometer_km: 100.0,
        is_virtual,
        created_at: Utc::now(),
    };
    let id = vehicle.id;
    env.registry.insert(vehicle).await;
    id
}

async fn seed_state(env: &SimEnv, vehicle_id: Uuid, battery: i32) {
    env.service
        .update_state(
            vehicle_id,
            UpdateVehicleStateRequest {
                latitude: Some(10.762622),
                longitude: Some(106.660172),
                battery_level: Some(battery),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn charging_tick_raises_battery_without_moving_the_vehicle() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::Charging, true).await;
    seed_state(&env, vehicle_id, 15).await;

    env.simulator.run_telemetry_tick().await;

    let state = env.service.get_state(vehicle_id).await.unwrap();
    assert_eq!(state.battery_level, Some(17));
    assert!(state.is_charging);
    assert_eq!(state.latitude, Some(10.762622));
    assert_eq!(state.longitude, Some(106.660172));
    assert_eq!(state.speed_kmh, Some(0.0));
    assert_eq!(state.odometer_km, 100.0);
    assert_eq!(state.data_source, DataSource::VirtualCar);

    // El tick de telemetría no toca el estado operacional
    let vehicle = env.registry.find_by_id(vehicle_id).await.unwrap().unwrap();
    assert_eq!(vehicle.status, VehicleStatus::Charging);
}

#[tokio::test]
async fn charging_tick_clamps_battery_at_one_hundred() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::Charging, true).await;
    seed_state(&env, vehicle_id, 99).await;

    env.simulator.run_telemetry_tick().await;
    let state = env.service.get_state(vehicle_id).await.unwrap();
    assert_eq!(state.battery_level, Some(100));

    env.simulator.run_telemetry_tick().await;
    let state = env.service.get_state(vehicle_id).await.unwrap();
    assert_eq!(state.battery_level, Some(100));
}

#[tokio::test]
async fn in_use_tick_maintains_physical_invariants() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::InUse, true).await;
    seed_state(&env, vehicle_id, 50).await;
    let before = env.service.get_state(vehicle_id).await.unwrap();

    env.simulator.run_telemetry_tick().await;

    let state = env.service.get_state(vehicle_id).await.unwrap();

    // Posición dentro del área de servicio
    let lat = state.latitude.unwrap();
    let lon = state.longitude.unwrap();
    assert!((10.6..=10.9).contains(&lat));
    assert!((106.5..=106.9).contains(&lon));

    // Velocidad dentro de [20, 80] y odómetro avanzado exactamente speed/720
    let speed = state.speed_kmh.unwrap();
    assert!((20.0..=80.0).contains(&speed));
    let expected_odometer = before.odometer_km + speed / 720.0;
    assert!((state.odometer_km - expected_odometer).abs() < 1e-9);

    // El drenaje por tick es menor a un punto: el floor baja exactamente uno
    assert_eq!(state.battery_level, Some(49));
    assert!(!state.is_charging);
    assert_eq!(state.data_source, DataSource::VirtualCar);
}

#[tokio::test]
async fn available_tick_holds_position_and_drains_standby_power() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::Available, true).await;
    seed_state(&env, vehicle_id, 40).await;

    env.simulator.run_telemetry_tick().await;

    let state = env.service.get_state(vehicle_id).await.unwrap();
    assert_eq!(state.latitude, Some(10.762622));
    assert_eq!(state.longitude, Some(106.660172));
    assert_eq!(state.speed_kmh, Some(0.0));
    assert_eq!(state.odometer_km, 100.0);
    let battery = state.battery_level.unwrap();
    assert!((39..=40).contains(&battery));
    assert!(!state.is_charging);
}

#[tokio::test]
async fn sink_statuses_are_excluded_from_telemetry() {
    let env = build_sim_env(default_settings());
    let maintenance = add_vehicle(&env, VehicleStatus::Maintenance, true).await;
    let damaged = add_vehicle(&env, VehicleStatus::Damaged, true).await;

    env.simulator.run_telemetry_tick().await;

    assert!(env.states.find_by_vehicle(maintenance).await.unwrap().is_none());
    assert!(env.states.find_by_vehicle(damaged).await.unwrap().is_none());
}

#[tokio::test]
async fn non_virtual_vehicles_are_never_simulated() {
    let env = build_sim_env(default_settings());
    let physical = add_vehicle(&env, VehicleStatus::InUse, false).await;

    env.simulator.run_telemetry_tick().await;

    assert!(env.states.find_by_vehicle(physical).await.unwrap().is_none());
}

#[tokio::test]
async fn disabled_simulator_generates_no_telemetry() {
    let env = build_sim_env(SimulatorSettings::new(false, 5000, 30_000, HashSet::new()));
    let vehicle_id = add_vehicle(&env, VehicleStatus::InUse, true).await;

    env.simulator.run_telemetry_tick().await;
    assert!(env.states.find_by_vehicle(vehicle_id).await.unwrap().is_none());

    // Al rehabilitarlo, el siguiente tick vuelve a producir telemetría
    env.settings.set_enabled(true);
    env.simulator.run_telemetry_tick().await;
    assert!(env.states.find_by_vehicle(vehicle_id).await.unwrap().is_some());
}

#[tokio::test]
async fn allow_list_limits_the_tick_to_selected_vehicles() {
    let env = build_sim_env(default_settings());
    let selected = add_vehicle(&env, VehicleStatus::InUse, true).await;
    let excluded = add_vehicle(&env, VehicleStatus::InUse, true).await;

    env.settings.set_vehicle_ids(vec![selected]).await;
    env.simulator.run_telemetry_tick().await;

    assert!(env.states.find_by_vehicle(selected).await.unwrap().is_some());
    assert!(env.states.find_by_vehicle(excluded).await.unwrap().is_none());
}

#[tokio::test]
async fn failure_on_one_vehicle_does_not_stop_the_tick() {
    let env = build_sim_env(default_settings());
    let failing = add_vehicle(&env, VehicleStatus::InUse, true).await;
    let healthy = add_vehicle(&env, VehicleStatus::InUse, true).await;

    env.states.fail_saves_for(failing).await;
    env.simulator.run_telemetry_tick().await;

    assert!(env.states.find_by_vehicle(failing).await.unwrap().is_none());
    assert!(env.states.find_by_vehicle(healthy).await.unwrap().is_some());
}

#[tokio::test]
async fn telemetry_sequence_strictly_increases_across_ticks() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::InUse, true).await;

    let mut last_sequence = 0;
    for _ in 0..3 {
        env.simulator.run_telemetry_tick().await;
        let state = env.service.get_state(vehicle_id).await.unwrap();
        let sequence = state.message_sequence.unwrap();
        assert!(sequence > last_sequence);
        last_sequence = sequence;
    }
}

#[tokio::test]
async fn status_tick_eventually_releases_a_fully_charged_vehicle() {
    let env = build_sim_env(default_settings());
    // Sin estado previo, la batería por defecto es 100 (≥ 95)
    let vehicle_id = add_vehicle(&env, VehicleStatus::Charging, true).await;

    let mut transitioned = false;
    for _ in 0..2000 {
        env.simulator.run_status_tick().await;
        let vehicle = env.registry.find_by_id(vehicle_id).await.unwrap().unwrap();
        if vehicle.status == VehicleStatus::Available {
            transitioned = true;
            break;
        }
    }
    assert!(transitioned, "CHARGING vehicle at 100% never became AVAILABLE");
}

#[tokio::test]
async fn status_transition_is_recorded_in_the_event_log() {
    let env = build_sim_env(default_settings());
    // Sin estado previo, la batería por defecto es 100 (≥ 95)
    let vehicle_id = add_vehicle(&env, VehicleStatus::Charging, true).await;

    for _ in 0..2000 {
        env.simulator.run_status_tick().await;
        let vehicle = env.registry.find_by_id(vehicle_id).await.unwrap().unwrap();
        if vehicle.status == VehicleStatus::Available {
            break;
        }
    }
    // El registro del evento es fire-and-forget: darle un instante a la tarea
    tokio::time::sleep(Duration::from_millis(50)).await;

    let events = env.events.snapshot().await;
    let status_events: Vec<_> = events
        .iter()
        .filter(|e| e.event_type == EventType::StatusChanged)
        .collect();
    assert_eq!(status_events.len(), 1);
    let payload = status_events[0].event_data.as_ref().unwrap();
    assert_eq!(payload["old_status"], "CHARGING");
    assert_eq!(payload["new_status"], "AVAILABLE");
}

#[tokio::test]
async fn status_tick_never_rents_out_a_low_battery_vehicle() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::Available, true).await;
    seed_state(&env, vehicle_id, 10).await;

    for _ in 0..300 {
        env.simulator.run_status_tick().await;
        let vehicle = env.registry.find_by_id(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Available);
    }
}

#[tokio::test]
async fn status_tick_never_releases_a_half_charged_vehicle() {
    let env = build_sim_env(default_settings());
    let vehicle_id = add_vehicle(&env, VehicleStatus::Charging, true).await;
    seed_state(&env, vehicle_id, 50).await;

    for _ in 0..300 {
        env.simulator.run_status_tick().await;
        let vehicle = env.registry.find_by_id(vehicle_id).await.unwrap().unwrap();
        assert_eq!(vehicle.status, VehicleStatus::Charging);
    }
}

#[tokio::test]
async fn status_tick_ignores_sink_statuses() {
    let env = build_sim_env(default_settings());
    let maintenance = add_vehicle(&env, VehicleStatus::Maintenance, true).await;
    let damaged = add_vehicle(&env, VehicleStatus::Damaged, true).await;

    for _ in 0..300 {
        env.simulator.run_status_tick().await;
    }

    let m = env.registry.find_by_id(maintenance).await.unwrap().unwrap();
    let d = env.registry.find_by_id(damaged).await.unwrap().unwrap();
    assert_eq!(m.status, VehicleStatus::Maintenance);
    assert_eq!(d.status, VehicleStatus::Damaged);
}

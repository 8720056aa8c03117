//! Fleet Management - motor de sincronización de estado de flota
//!
//! Mantiene un estado actual autoritativo por vehículo (GPS, batería,
//! velocidad, odómetro) alimentado por ediciones manuales y por un simulador
//! de telemetría sintética, con reglas de orden y monotonía en el merge.

pub mod config;
pub mod controllers;
pub mod database;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod simulator;
pub mod state;
pub mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use config::simulator::SimulatorSettings;
use middleware::cors::cors_middleware;
use repositories::event_log_repository::PgEventLogRepository;
use repositories::vehicle_repository::PgVehicleRepository;
use repositories::vehicle_state_repository::PgVehicleStateRepository;
use repositories::{EventLogStore, VehicleRegistry, VehicleStateStore};
use services::{EventLogService, VehicleStateService};
use simulator::VirtualVehicleSimulator;
use state::AppState;

pub async fn run() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Fleet Management - Vehicle State Synchronization Engine");
    info!("==========================================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = database::run_migrations(&pool).await {
        error!("❌ Error creando el schema: {}", e);
        return Err(anyhow::anyhow!("Error de schema: {}", e));
    }
    info!("✅ Schema de base de datos listo");

    // Colaboradores del motor de sincronización
    let registry: Arc<dyn VehicleRegistry> = Arc::new(PgVehicleRepository::new(pool.clone()));
    let states: Arc<dyn VehicleStateStore> = Arc::new(PgVehicleStateRepository::new(pool.clone()));
    let events: Arc<dyn EventLogStore> = Arc::new(PgEventLogRepository::new(pool.clone()));

    let event_service = EventLogService::new(events);
    let state_service = Arc::new(VehicleStateService::new(
        Arc::clone(&registry),
        states,
        event_service,
    ));

    // Simulador de vehículos virtuales
    let simulator_settings = Arc::new(SimulatorSettings::from_env());
    let vehicle_simulator = Arc::new(VirtualVehicleSimulator::new(
        Arc::clone(&registry),
        Arc::clone(&state_service),
        Arc::clone(&simulator_settings),
    ));
    vehicle_simulator.spawn();
    info!(
        "🤖 Simulador {} (telemetría cada {}ms, estados cada {}ms)",
        if simulator_settings.is_enabled() { "habilitado" } else { "deshabilitado" },
        simulator_settings.update_interval_ms(),
        simulator_settings.status_change_interval_ms()
    );

    // Crear router de la API
    let config = EnvironmentConfig::default();
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    let app_state = AppState::new(pool, config, state_service, simulator_settings);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/v1/vehicles", routes::vehicle_routes::create_vehicle_router())
        .nest("/api/v1/simulator", routes::simulator_routes::create_simulator_router())
        .layer(cors_middleware())
        .with_state(app_state);

    info!("🚀 Servidor escuchando en {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de health check
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fleet-management",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

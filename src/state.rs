//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::config::simulator::SimulatorSettings;
use crate::services::VehicleStateService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub state_service: Arc<VehicleStateService>,
    pub simulator_settings: Arc<SimulatorSettings>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        config: EnvironmentConfig,
        state_service: Arc<VehicleStateService>,
        simulator_settings: Arc<SimulatorSettings>,
    ) -> Self {
        Self {
            pool,
            config,
            state_service,
            simulator_settings,
        }
    }
}

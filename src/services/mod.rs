//! Services module
//!
//! Este módulo contiene la lógica de negocio de la sincronización de estado:
//! el merge puro de actualizaciones parciales, el servicio que orquesta el
//! ciclo read-modify-write y el registro best-effort de eventos.

pub mod event_log_service;
pub mod state_merger;
pub mod vehicle_state_service;

pub use event_log_service::EventLogService;
pub use vehicle_state_service::VehicleStateService;

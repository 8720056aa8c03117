//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL con las convenciones estándar.

pub mod event_log;
pub mod response;
pub mod vehicle;
pub mod vehicle_state;

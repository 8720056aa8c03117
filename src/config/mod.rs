//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y los ajustes del simulador.

pub mod environment;
pub mod simulator;

pub use environment::*;
pub use simulator::SimulatorSettings;

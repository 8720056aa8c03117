//! Simulador de vehículos virtuales
//!
//! Genera telemetría sintética plausible y transiciones de estado para los
//! vehículos marcados como virtuales, alimentando el mismo motor de merge
//! que las actualizaciones manuales.

pub mod status_machine;
pub mod virtual_vehicle_simulator;

pub use virtual_vehicle_simulator::VirtualVehicleSimulator;

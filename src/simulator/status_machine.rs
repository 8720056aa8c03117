//! Máquina de estados operacionales del simulador
//!
//! Cinco estados cerrados, de los cuales el simulador solo transiciona tres.
//! `MAINTENANCE` y `DAMAGED` son sumideros: solo operaciones manuales
//! externas sacan a un vehículo de ellos.

use rand::Rng;

use crate::models::vehicle::VehicleStatus;

/// Probabilidad (en %) de evaluar una transición por vehículo por tick
pub const STATUS_CHANGE_PROBABILITY: u32 = 5;

/// Evalúa a lo sumo una transición de estado para un vehículo.
///
/// - AVAILABLE → IN_USE solo con batería > 20.
/// - IN_USE → AVAILABLE (moneda al aire); si no, IN_USE → CHARGING
///   solo con batería < 30. Ambas salidas son mutuamente excluyentes.
/// - CHARGING → AVAILABLE solo con batería ≥ 95.
pub fn next_status(
    current: VehicleStatus,
    battery_level: i32,
    rng: &mut impl Rng,
) -> Option<VehicleStatus> {
    match current {
        VehicleStatus::Available => {
            if battery_level > 20 {
                Some(VehicleStatus::InUse)
            } else {
                None
            }
        }
        VehicleStatus::InUse => {
            if rng.gen_bool(0.5) {
                Some(VehicleStatus::Available)
            } else if battery_level < 30 {
                Some(VehicleStatus::Charging)
            } else {
                None
            }
        }
        VehicleStatus::Charging => {
            if battery_level >= 95 {
                Some(VehicleStatus::Available)
            } else {
                None
            }
        }
        VehicleStatus::Maintenance | VehicleStatus::Damaged => None,
    }
}

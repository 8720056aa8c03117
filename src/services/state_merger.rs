//! Lógica pura de merge de actualizaciones parciales de estado
//!
//! Aplica una actualización parcial sobre el estado actual de un vehículo
//! imponiendo las reglas de ordenamiento y monotonía. El rechazo es atómico:
//! si alguna regla falla, ningún campo de la actualización se aplica.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::models::vehicle_state::{DataSource, UpdateVehicleStateRequest, VehicleState};
use crate::utils::errors::{AppError, AppResult};

/// Par (valor anterior, valor nuevo) de un campo que cambió
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDelta {
    pub old: serde_json::Value,
    pub new: serde_json::Value,
}

/// Conjunto de diferencias a nivel de campo producido por un merge aceptado.
/// Solo se usa para el log de cambios, nunca para decidir el rechazo.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(BTreeMap<&'static str, FieldDelta>);

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    fn record_if_changed<T: Serialize + PartialEq>(
        &mut self,
        field: &'static str,
        old: &T,
        new: &T,
    ) {
        if old != new {
            self.0.insert(
                field,
                FieldDelta {
                    old: json!(old),
                    new: json!(new),
                },
            );
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!(self)
    }
}

/// Resultado de un merge aceptado
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub state: VehicleState,
    pub changes: ChangeSet,
}

/// Aplica `request` sobre `current` con semántica de actualización parcial.
///
/// Reglas:
/// - El odómetro nunca decrece (`OdometerRegression`).
/// - Para fuentes ordenadas (ni MANUAL ni VIRTUAL_CAR) la secuencia debe
///   crecer estrictamente (`OutOfOrderMessage`).
/// - Sin fuente declarada, la actualización se registra como MANUAL.
/// - `last_updated_at` se estampa en todo merge aceptado, cambien o no
///   campos visibles.
pub fn apply_update(
    current: &VehicleState,
    request: &UpdateVehicleStateRequest,
    now: DateTime<Utc>,
) -> AppResult<MergeOutcome> {
    let source = request.data_source.unwrap_or(DataSource::Manual);

    // Las reglas se evalúan antes de tocar campo alguno
    if let Some(requested) = request.message_sequence {
        if source.is_ordered() {
            if let Some(current_seq) = current.message_sequence {
                if requested <= current_seq {
                    return Err(AppError::OutOfOrderMessage {
                        current: current_seq,
                        requested,
                    });
                }
            }
        }
    }

    if let Some(requested) = request.odometer_km {
        if requested < current.odometer_km {
            return Err(AppError::OdometerRegression {
                current: current.odometer_km,
                requested,
            });
        }
    }

    let mut state = current.clone();
    let mut changes = ChangeSet::default();

    if let Some(latitude) = request.latitude {
        changes.record_if_changed("latitude", &state.latitude, &Some(latitude));
        state.latitude = Some(latitude);
    }

    if let Some(longitude) = request.longitude {
        changes.record_if_changed("longitude", &state.longitude, &Some(longitude));
        state.longitude = Some(longitude);
    }

    if let Some(battery_level) = request.battery_level {
        changes.record_if_changed("battery_level", &state.battery_level, &Some(battery_level));
        state.battery_level = Some(battery_level);
    }

    if let Some(is_charging) = request.is_charging {
        changes.record_if_changed("is_charging", &state.is_charging, &is_charging);
        state.is_charging = is_charging;
    }

    if let Some(speed_kmh) = request.speed_kmh {
        changes.record_if_changed("speed_kmh", &state.speed_kmh, &Some(speed_kmh));
        state.speed_kmh = Some(speed_kmh);
    }

    if let Some(odometer_km) = request.odometer_km {
        changes.record_if_changed("odometer_km", &state.odometer_km, &odometer_km);
        state.odometer_km = odometer_km;
    }

    state.data_source = source;
    if let Some(sequence) = request.message_sequence {
        state.message_sequence = Some(sequence);
    }
    state.last_updated_at = now;

    Ok(MergeOutcome { state, changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn base_state() -> VehicleState {
        VehicleState {
            vehicle_id: Uuid::new_v4(),
            latitude: Some(10.762622),
            longitude: Some(106.660172),
            battery_level: Some(80),
            is_charging: false,
            speed_kmh: Some(10.0),
            odometer_km: 1000.0,
            last_updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            data_source: DataSource::System,
            message_sequence: Some(5),
        }
    }

    fn merge_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn partial_update_preserves_absent_fields() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(50),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();

        assert_eq!(outcome.state.battery_level, Some(50));
        assert_eq!(outcome.state.speed_kmh, Some(10.0));
        assert_eq!(outcome.state.latitude, Some(10.762622));
        assert_eq!(outcome.state.odometer_km, 1000.0);
        assert_eq!(outcome.changes.len(), 1);
        assert!(outcome.changes.contains("battery_level"));
    }

    #[test]
    fn odometer_regression_is_rejected() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            odometer_km: Some(999.9),
            battery_level: Some(10),
            ..Default::default()
        };

        let err = apply_update(&current, &request, merge_time()).unwrap_err();
        assert!(matches!(
            err,
            AppError::OdometerRegression { current, requested }
                if current == 1000.0 && requested == 999.9
        ));
    }

    #[test]
    fn odometer_equal_to_current_is_accepted() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            odometer_km: Some(1000.0),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert_eq!(outcome.state.odometer_km, 1000.0);
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn ordered_source_rejects_stale_sequence() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(1),
            data_source: Some(DataSource::System),
            message_sequence: Some(5),
            ..Default::default()
        };

        let err = apply_update(&current, &request, merge_time()).unwrap_err();
        assert!(matches!(
            err,
            AppError::OutOfOrderMessage { current: 5, requested: 5 }
        ));
    }

    #[test]
    fn ordered_source_accepts_greater_sequence() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(70),
            data_source: Some(DataSource::System),
            message_sequence: Some(6),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert_eq!(outcome.state.message_sequence, Some(6));
        assert_eq!(outcome.state.battery_level, Some(70));
    }

    #[test]
    fn manual_source_may_restart_sequence() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(70),
            data_source: Some(DataSource::Manual),
            message_sequence: Some(1),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert_eq!(outcome.state.message_sequence, Some(1));
    }

    #[test]
    fn virtual_car_source_may_restart_sequence() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            speed_kmh: Some(42.0),
            data_source: Some(DataSource::VirtualCar),
            message_sequence: Some(1),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert_eq!(outcome.state.message_sequence, Some(1));
        assert_eq!(outcome.state.data_source, DataSource::VirtualCar);
    }

    #[test]
    fn undeclared_source_defaults_to_manual_and_skips_ordering() {
        let current = base_state();
        // Secuencia vieja sin fuente declarada: exenta del chequeo de orden
        let request = UpdateVehicleStateRequest {
            battery_level: Some(60),
            message_sequence: Some(2),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert_eq!(outcome.state.data_source, DataSource::Manual);
        assert_eq!(outcome.state.message_sequence, Some(2));
    }

    #[test]
    fn identical_values_yield_empty_change_set() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(80),
            speed_kmh: Some(10.0),
            is_charging: Some(false),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        assert!(outcome.changes.is_empty());
        // El merge fue aceptado: el timestamp avanza igual
        assert_eq!(outcome.state.last_updated_at, merge_time());
    }

    #[test]
    fn last_updated_at_is_stamped_on_every_accepted_merge() {
        let current = base_state();
        let outcome =
            apply_update(&current, &UpdateVehicleStateRequest::default(), merge_time()).unwrap();
        assert_eq!(outcome.state.last_updated_at, merge_time());
    }

    #[test]
    fn change_set_serializes_old_and_new_values() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            battery_level: Some(55),
            ..Default::default()
        };

        let outcome = apply_update(&current, &request, merge_time()).unwrap();
        let payload = outcome.changes.to_json();
        assert_eq!(payload["battery_level"]["old"], 80);
        assert_eq!(payload["battery_level"]["new"], 55);
    }

    #[test]
    fn sequence_rule_checked_before_any_field_applies() {
        let current = base_state();
        let request = UpdateVehicleStateRequest {
            latitude: Some(11.0),
            odometer_km: Some(2000.0),
            data_source: Some(DataSource::System),
            message_sequence: Some(3),
            ..Default::default()
        };

        // El rechazo debe ser atómico: nada del request sobrevive
        assert!(apply_update(&current, &request, merge_time()).is_err());
    }
}

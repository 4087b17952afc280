//! Übersetzung des rohen Lenkwinkels in den Achsenwert des Controllers.

use crate::config::BridgeConfig;

/// Full scale of the signed 16-bit steering axis.
const AXIS_FULL_SCALE: f32 = 32767.0;

/// Skaliert den Lenkwert auf den Achsenbereich des virtuellen Gamepads.
///
/// Der rohe Wert wird zuerst mit der Sensitivität multipliziert. Liegt der
/// Betrag des Ergebnisses innerhalb der Deadzone, ist die Ausgabe exakt 0.
/// Ansonsten wird auf den i16-Bereich skaliert und gegen Überlauf geklemmt
/// (sensitivity * rotation_x kann 1.0 deutlich überschreiten).
pub fn axis_value(rotation_x: f32, config: &BridgeConfig) -> i16 {
    let steering_amount = rotation_x * config.steering_sensitivity;

    if steering_amount.abs() < config.steering_deadzone {
        return 0;
    }

    (steering_amount * AXIS_FULL_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

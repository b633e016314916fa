// ── Host framework boundary ──
//
// The accessory framework is an injected capability, never ambient
// state: each sync object receives a `CharacteristicSink` at
// construction and pushes normalized values through it. Host-initiated
// writes arrive as plain async calls on the sync objects; the `Result`
// return is the resolve-once/reject-once completion contract.

use std::fmt;

/// Characteristics the sync layer can report to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    Power,
    Brightness,
    ColorTemperature,
    Hue,
    Saturation,
    ContactState,
    MotionDetected,
}

/// A normalized characteristic value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl fmt::Display for CharacteristicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Receives characteristic updates pushed toward the host framework.
pub trait CharacteristicSink: Send + Sync {
    fn update(&self, characteristic: Characteristic, value: CharacteristicValue);
}

// wyzely-core: Accessory synchronization layer between wyzely-api and
// the host accessory framework.

pub mod accessory;
pub mod color;
pub mod error;
pub mod host;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use accessory::{
    AccessoryInfo, AccessorySync, ContactSensorSync, LightSync, MeshLightSync, MotionSensorSync,
};
pub use error::CoreError;
pub use host::{Characteristic, CharacteristicSink, CharacteristicValue};
pub use model::{DeviceSnapshot, ProductKind};

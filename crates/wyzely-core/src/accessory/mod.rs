// ── Accessory synchronization ──
//
// One sync object per remote device. Each consumes the shared
// `DeviceClient` to push host-initiated writes and pull remote
// property lists, and an injected `CharacteristicSink` to report
// normalized state back to the host framework.

mod contact;
mod light;
mod mesh_light;
mod motion;

pub use contact::ContactSensorSync;
pub use light::LightSync;
pub use mesh_light::MeshLightSync;
pub use motion::MotionSensorSync;

use async_trait::async_trait;

use crate::color;
use crate::error::CoreError;
use crate::model::DeviceSnapshot;

// Vendor property codes.
pub const PROP_POWER: &str = "P3";
pub const PROP_BRIGHTNESS: &str = "P1501";
pub const PROP_COLOR_TEMP: &str = "P1502";
pub const PROP_COLOR: &str = "P1507";
pub const PROP_CONTACT_STATE: &str = "open_close_state";
pub const PROP_MOTION_STATE: &str = "motion_state";

/// Host-side color-temperature scale. Inverted relative to Kelvin:
/// larger host values are warmer.
pub(crate) const HOST_COLOR_TEMP_MIN: f64 = 500.0;
pub(crate) const HOST_COLOR_TEMP_MAX: f64 = 140.0;

/// Identity and metadata shared by every accessory kind.
#[derive(Debug, Clone)]
pub struct AccessoryInfo {
    pub mac: String,
    pub product_model: String,
    pub product_type: String,
    pub nickname: Option<String>,
}

impl AccessoryInfo {
    pub fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        Self {
            mac: snapshot.mac.clone(),
            product_model: snapshot.product_model.clone(),
            product_type: snapshot.product_type.clone(),
            nickname: snapshot.nickname.clone(),
        }
    }

    /// Whether this accessory models the given device.
    pub fn matches(&self, snapshot: &DeviceSnapshot) -> bool {
        self.mac == snapshot.mac
    }
}

/// Pull one fresh snapshot's worth of remote state into the host.
///
/// Invoked by an external poll loop whenever a new snapshot is
/// available; implementations may issue further reads (property lists)
/// but never writes.
#[async_trait]
pub trait AccessorySync: Send + Sync {
    fn info(&self) -> &AccessoryInfo;

    async fn update_characteristics(&self, snapshot: &DeviceSnapshot) -> Result<(), CoreError>;
}

/// The service encodes switches as "1"/"0" strings.
pub(crate) fn switch_value(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

pub(crate) fn kelvin_to_host(kelvin: f64, kelvin_min: f64, kelvin_max: f64) -> f64 {
    color::float_to_range(
        color::range_to_float(kelvin, kelvin_min, kelvin_max),
        HOST_COLOR_TEMP_MIN,
        HOST_COLOR_TEMP_MAX,
    )
}

pub(crate) fn host_to_kelvin(host: f64, kelvin_min: f64, kelvin_max: f64) -> f64 {
    color::float_to_range(
        color::range_to_float(host, HOST_COLOR_TEMP_MIN, HOST_COLOR_TEMP_MAX),
        kelvin_min,
        kelvin_max,
    )
}

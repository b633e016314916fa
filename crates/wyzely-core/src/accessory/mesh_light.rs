// Multi-channel (mesh) light synchronization.
//
// The service takes color as one combined hex write while hosts emit
// hue and saturation as independent events, so the two are paired
// through an explicit staging state: the first dimension set after
// construction stages silently, the opposite dimension triggers the
// combined write, and either outcome of that write returns the state
// to idle. Remote polls refresh the cached pair so later edits pair
// against current truth rather than stale cache.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wyzely_api::DeviceClient;

use crate::color::{self, Hsv};
use crate::error::CoreError;
use crate::host::{Characteristic, CharacteristicSink, CharacteristicValue};
use crate::model::DeviceSnapshot;

use super::light::{debounced, push_color_temp, push_int};
use super::{
    AccessoryInfo, AccessorySync, PROP_BRIGHTNESS, PROP_COLOR, PROP_COLOR_TEMP, PROP_POWER,
    host_to_kelvin, switch_value,
};

/// Kelvin bounds for mesh bulbs (wider than single-element ones).
const KELVIN_MIN: f64 = 1800.0;
const KELVIN_MAX: f64 = 6500.0;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDimension {
    Hue,
    Saturation,
}

/// Two-phase pairing of independent hue and saturation edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingColorEdit {
    Idle,
    Staged(ColorDimension),
}

#[derive(Debug)]
struct ColorState {
    hue: f64,
    saturation: f64,
    pending: PendingColorEdit,
}

pub struct MeshLightSync {
    info: AccessoryInfo,
    client: DeviceClient,
    sink: Arc<dyn CharacteristicSink>,
    debounce: Duration,
    brightness_serial: AtomicU64,
    color_temp_serial: AtomicU64,
    color: Mutex<ColorState>,
}

impl MeshLightSync {
    pub fn new(
        client: DeviceClient,
        sink: Arc<dyn CharacteristicSink>,
        snapshot: &DeviceSnapshot,
    ) -> Self {
        Self {
            info: AccessoryInfo::from_snapshot(snapshot),
            client,
            sink,
            debounce: DEFAULT_DEBOUNCE,
            brightness_serial: AtomicU64::new(0),
            color_temp_serial: AtomicU64::new(0),
            color: Mutex::new(ColorState {
                hue: 0.0,
                saturation: 0.0,
                pending: PendingColorEdit::Idle,
            }),
        }
    }

    /// Override the write debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub async fn set_power(&self, on: bool) -> Result<(), CoreError> {
        info!(mac = %self.info.mac, on, "setting power");
        self.client
            .set_property(
                &self.info.mac,
                &self.info.product_model,
                PROP_POWER,
                switch_value(on),
            )
            .await?;
        Ok(())
    }

    pub async fn set_brightness(&self, percent: u8) -> Result<(), CoreError> {
        if !debounced(&self.brightness_serial, self.debounce).await {
            debug!(mac = %self.info.mac, percent, "brightness superseded within debounce window");
            return Ok(());
        }
        info!(mac = %self.info.mac, percent, "setting brightness");
        self.client
            .set_property(
                &self.info.mac,
                &self.info.product_model,
                PROP_BRIGHTNESS,
                &percent.to_string(),
            )
            .await?;
        Ok(())
    }

    pub async fn set_color_temperature(&self, host_value: u32) -> Result<(), CoreError> {
        if !debounced(&self.color_temp_serial, self.debounce).await {
            debug!(mac = %self.info.mac, host_value, "color temperature superseded within debounce window");
            return Ok(());
        }
        let kelvin = host_to_kelvin(f64::from(host_value), KELVIN_MIN, KELVIN_MAX);
        info!(mac = %self.info.mac, host_value, kelvin, "setting color temperature");
        self.client
            .set_property(
                &self.info.mac,
                &self.info.product_model,
                PROP_COLOR_TEMP,
                &format!("{kelvin:.0}"),
            )
            .await?;
        Ok(())
    }

    pub async fn set_hue(&self, hue: f64) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, hue, "staging hue");
        self.stage(ColorDimension::Hue, hue).await
    }

    pub async fn set_saturation(&self, saturation: f64) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, saturation, "staging saturation");
        self.stage(ColorDimension::Saturation, saturation).await
    }

    /// Record one dimension; write the combined color once both have
    /// been set since the last write. The staged edit is consumed (and
    /// the state returns to idle) whether or not the write succeeds --
    /// a failed combined write is surfaced, never retried.
    async fn stage(&self, dimension: ColorDimension, value: f64) -> Result<(), CoreError> {
        let ready = {
            let mut state = self.color.lock().expect("color state lock poisoned");
            match dimension {
                ColorDimension::Hue => state.hue = value,
                ColorDimension::Saturation => state.saturation = value,
            }
            match state.pending {
                PendingColorEdit::Idle => {
                    state.pending = PendingColorEdit::Staged(dimension);
                    None
                }
                // The same dimension again only re-stages its value.
                PendingColorEdit::Staged(staged) if staged == dimension => None,
                PendingColorEdit::Staged(_) => {
                    state.pending = PendingColorEdit::Idle;
                    Some(Hsv {
                        hue: state.hue,
                        saturation: state.saturation,
                        value: 100.0,
                    })
                }
            }
        };

        let Some(hsv) = ready else {
            return Ok(());
        };
        let hex = color::hsv_to_hex(hsv);
        info!(
            mac = %self.info.mac,
            hue = hsv.hue,
            saturation = hsv.saturation,
            %hex,
            "writing combined color"
        );
        self.client
            .set_property(&self.info.mac, &self.info.product_model, PROP_COLOR, &hex)
            .await?;
        Ok(())
    }

    /// Decode the remote hex color, refreshing both the host and the
    /// cached pair future edits stage against. Malformed values are
    /// logged and skipped; a bad remote color must never take the
    /// accessory down.
    fn apply_remote_color(&self, raw: &str) {
        let hsv = match color::hex_to_hsv(raw) {
            Ok(hsv) => hsv,
            Err(e) => {
                warn!(mac = %self.info.mac, raw, error = %e, "ignoring malformed remote color");
                return;
            }
        };

        {
            let mut state = self.color.lock().expect("color state lock poisoned");
            state.hue = hsv.hue;
            state.saturation = hsv.saturation;
        }

        self.sink
            .update(Characteristic::Hue, CharacteristicValue::Float(hsv.hue));
        self.sink.update(
            Characteristic::Saturation,
            CharacteristicValue::Float(hsv.saturation),
        );
    }
}

#[async_trait]
impl AccessorySync for MeshLightSync {
    fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    async fn update_characteristics(&self, snapshot: &DeviceSnapshot) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, "updating mesh light state");
        let properties = self
            .client
            .get_property_list(&snapshot.mac, &snapshot.product_model)
            .await?;

        for property in properties {
            match property.pid.as_str() {
                PROP_POWER => self.sink.update(
                    Characteristic::Power,
                    CharacteristicValue::Bool(property.value == "1"),
                ),
                PROP_BRIGHTNESS => {
                    push_int(&*self.sink, Characteristic::Brightness, &property.value);
                }
                PROP_COLOR_TEMP => {
                    push_color_temp(&*self.sink, &property.value, KELVIN_MIN, KELVIN_MAX);
                }
                PROP_COLOR => self.apply_remote_color(&property.value),
                _ => {}
            }
        }
        Ok(())
    }
}

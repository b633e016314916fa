// Single-channel light synchronization.
//
// Power writes go out immediately. Brightness and color-temperature
// writes sit out a short debounce so a host slider dragging through
// values floods neither the service nor the bulb: only the most recent
// write in a window is transmitted, and superseded ones complete
// without a remote call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wyzely_api::DeviceClient;

use crate::error::CoreError;
use crate::host::{Characteristic, CharacteristicSink, CharacteristicValue};
use crate::model::DeviceSnapshot;

use super::{
    AccessoryInfo, AccessorySync, PROP_BRIGHTNESS, PROP_COLOR_TEMP, PROP_POWER, host_to_kelvin,
    kelvin_to_host, switch_value,
};

/// Kelvin bounds for single-element bulbs.
const KELVIN_MIN: f64 = 2700.0;
const KELVIN_MAX: f64 = 6500.0;

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub struct LightSync {
    info: AccessoryInfo,
    client: DeviceClient,
    sink: Arc<dyn CharacteristicSink>,
    debounce: Duration,
    brightness_serial: AtomicU64,
    color_temp_serial: AtomicU64,
}

impl LightSync {
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
}

#[async_trait]
impl AccessorySync for LightSync {
    fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    async fn update_characteristics(&self, snapshot: &DeviceSnapshot) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, "updating light state");
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
                _ => {}
            }
        }
        Ok(())
    }
}

/// Wait out the debounce window. Returns `true` when this caller is
/// still the most recent writer and should transmit.
pub(crate) async fn debounced(serial: &AtomicU64, window: Duration) -> bool {
    let ticket = serial.fetch_add(1, Ordering::SeqCst) + 1;
    tokio::time::sleep(window).await;
    serial.load(Ordering::SeqCst) == ticket
}

pub(crate) fn push_int(sink: &dyn CharacteristicSink, characteristic: Characteristic, raw: &str) {
    match raw.parse::<i64>() {
        Ok(value) => sink.update(characteristic, CharacteristicValue::Int(value)),
        Err(_) => warn!(?characteristic, raw, "ignoring unparseable property value"),
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn push_color_temp(
    sink: &dyn CharacteristicSink,
    raw: &str,
    kelvin_min: f64,
    kelvin_max: f64,
) {
    let Ok(kelvin) = raw.parse::<f64>() else {
        warn!(raw, "ignoring unparseable color temperature");
        return;
    };
    let host = kelvin_to_host(kelvin, kelvin_min, kelvin_max);
    sink.update(
        Characteristic::ColorTemperature,
        CharacteristicValue::Int(host as i64),
    );
}

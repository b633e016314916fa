// Motion sensor synchronization.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use wyzely_api::DeviceClient;

use crate::error::CoreError;
use crate::host::{Characteristic, CharacteristicSink, CharacteristicValue};
use crate::model::DeviceSnapshot;

use super::{AccessoryInfo, AccessorySync, PROP_MOTION_STATE, switch_value};

pub struct MotionSensorSync {
    info: AccessoryInfo,
    client: DeviceClient,
    sink: Arc<dyn CharacteristicSink>,
}

impl MotionSensorSync {
    pub fn new(
        client: DeviceClient,
        sink: Arc<dyn CharacteristicSink>,
        snapshot: &DeviceSnapshot,
    ) -> Self {
        Self {
            info: AccessoryInfo::from_snapshot(snapshot),
            client,
            sink,
        }
    }

    /// Host-initiated write, only meaningful for simulated devices.
    pub async fn set_state(&self, detected: bool) -> Result<(), CoreError> {
        info!(mac = %self.info.mac, detected, "setting motion state");
        self.client
            .set_property(
                &self.info.mac,
                &self.info.product_model,
                PROP_MOTION_STATE,
                switch_value(detected),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccessorySync for MotionSensorSync {
    fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    async fn update_characteristics(&self, snapshot: &DeviceSnapshot) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, "updating motion sensor state");
        if let Some(detected) = snapshot.param_bool(PROP_MOTION_STATE) {
            self.sink.update(
                Characteristic::MotionDetected,
                CharacteristicValue::Bool(detected),
            );
        }
        Ok(())
    }
}

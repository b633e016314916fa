// Contact sensor synchronization.
//
// Normally read-only: the poll loop feeds snapshots in and the state
// flows out to the host. The write path is still honored for
// simulated and test devices.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use wyzely_api::DeviceClient;

use crate::error::CoreError;
use crate::host::{Characteristic, CharacteristicSink, CharacteristicValue};
use crate::model::DeviceSnapshot;

use super::{AccessoryInfo, AccessorySync, PROP_CONTACT_STATE, switch_value};

pub struct ContactSensorSync {
    info: AccessoryInfo,
    client: DeviceClient,
    sink: Arc<dyn CharacteristicSink>,
}

impl ContactSensorSync {
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
    pub async fn set_state(&self, open: bool) -> Result<(), CoreError> {
        info!(mac = %self.info.mac, open, "setting contact state");
        self.client
            .set_property(
                &self.info.mac,
                &self.info.product_model,
                PROP_CONTACT_STATE,
                switch_value(open),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AccessorySync for ContactSensorSync {
    fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    async fn update_characteristics(&self, snapshot: &DeviceSnapshot) -> Result<(), CoreError> {
        debug!(mac = %self.info.mac, "updating contact sensor state");
        if let Some(open) = snapshot.param_bool(PROP_CONTACT_STATE) {
            self.sink
                .update(Characteristic::ContactState, CharacteristicValue::Bool(open));
        }
        Ok(())
    }
}

// Device endpoints.
//
// Typed operations over the common authenticated call. The service
// reports semantic failures inside 2xx payloads; `authenticated_call`
// surfaces those as `Error::Api` rather than trusting the HTTP status.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::models::{DeviceRecord, ObjectList, Property, PropertyList};
use crate::session::SessionManager;

const OBJECT_LIST_PATH: &str = "app/v2/home_page/get_object_list";
const PROPERTY_LIST_PATH: &str = "app/v2/device/get_property_list";
const SET_PROPERTY_PATH: &str = "app/v2/device/set_property";

/// Typed device operations on top of a shared [`SessionManager`].
///
/// Cheap to clone; every accessory holds its own copy against the same
/// session.
#[derive(Clone)]
pub struct DeviceClient {
    session: Arc<SessionManager>,
}

impl DeviceClient {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// The underlying session (for auth flows that need direct access).
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// List every device registered to the account.
    ///
    /// `POST app/v2/home_page/get_object_list`
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        debug!("listing devices");
        let data = self
            .session
            .authenticated_call(OBJECT_LIST_PATH, json!({}))
            .await?;
        let list: ObjectList = decode(data)?;
        Ok(list.device_list)
    }

    /// Fetch the raw property list for one device.
    ///
    /// `POST app/v2/device/get_property_list`
    pub async fn get_property_list(&self, mac: &str, model: &str) -> Result<Vec<Property>, Error> {
        debug!(mac, model, "fetching property list");
        let data = self
            .session
            .authenticated_call(
                PROPERTY_LIST_PATH,
                json!({
                    "device_mac": mac,
                    "device_model": model,
                }),
            )
            .await?;
        let list: PropertyList = decode(data)?;
        Ok(list.property_list)
    }

    /// Write one property value.
    ///
    /// `POST app/v2/device/set_property`
    pub async fn set_property(
        &self,
        mac: &str,
        model: &str,
        pid: &str,
        pvalue: &str,
    ) -> Result<(), Error> {
        debug!(mac, model, pid, pvalue, "setting property");
        self.session
            .authenticated_call(
                SET_PROPERTY_PATH,
                json!({
                    "device_mac": mac,
                    "device_model": model,
                    "pid": pid,
                    "pvalue": pvalue,
                }),
            )
            .await?;
        Ok(())
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: serde_json::Value) -> Result<T, Error> {
    serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: data.to_string(),
    })
}

// Request and response envelopes for the Wyze cloud API.
//
// Every device-service POST body carries the same app-identity block
// plus a fresh millisecond timestamp; every response wraps its payload
// as `{ code, msg, data }` where a populated `msg` is a semantic
// failure even when the HTTP status is 2xx.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// App-emulation identity attached to every device-service request.
///
/// These mirror the official mobile app; the service rejects requests
/// without them. `sc` and `sv` are opaque protocol constants.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub app_name: String,
    pub app_ver: String,
    pub app_version: String,
    pub phone_id: String,
    pub phone_system_type: String,
    pub sc: String,
    pub sv: String,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            app_name: "com.hualai.WyzeCam".into(),
            app_ver: "com.hualai.WyzeCam___2.10.72".into(),
            app_version: "2.10.72".into(),
            phone_id: "bc151f39-787b-4871-be27-5a20fd0a1937".into(),
            phone_system_type: "1".into(),
            sc: "9f275790cab94a72bd206c8876429f3c".into(),
            sv: "9d74946e652647e9b6c9d59326aef104".into(),
        }
    }
}

impl AppIdentity {
    /// The common POST body: identity fields, the current access token,
    /// and a fresh timestamp. Endpoint-specific fields merge on top.
    pub(crate) fn envelope(&self, access_token: &str) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("access_token".into(), access_token.into());
        body.insert("app_name".into(), self.app_name.clone().into());
        body.insert("app_ver".into(), self.app_ver.clone().into());
        body.insert("app_version".into(), self.app_version.clone().into());
        body.insert("phone_id".into(), self.phone_id.clone().into());
        body.insert(
            "phone_system_type".into(),
            self.phone_system_type.clone().into(),
        );
        body.insert("sc".into(), self.sc.clone().into());
        body.insert("sv".into(), self.sv.clone().into());
        body.insert("ts".into(), Utc::now().timestamp_millis().into());
        body
    }
}

/// Response envelope shared by the device endpoints.
///
/// `code` is a string on most endpoints and a number on a few; it is
/// kept raw because `msg` is the authoritative failure signal.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Parse a response body and unwrap its `data` payload.
///
/// A populated `msg` is a semantic failure regardless of HTTP status --
/// the service reports stale tokens and invalid devices this way with
/// a 200.
pub(crate) fn unwrap_envelope(body: &str) -> Result<Value, Error> {
    let envelope: ApiEnvelope = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })?;

    if let Some(msg) = envelope.msg.as_deref().filter(|m| !m.is_empty()) {
        return Err(Error::Api {
            message: msg.to_owned(),
        });
    }

    Ok(envelope.data.unwrap_or(Value::Null))
}

pub(crate) fn preview(body: &str) -> &str {
    &body[..body.len().min(200)]
}

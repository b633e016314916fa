// ── Domain device model ──
//
// Bridges raw `wyzely_api` records into the snapshot type the
// accessory layer consumes. Snapshots are produced fresh on every poll
// and never mutated in place; each sync replaces the accessory's view.

use serde_json::{Map, Value};

use wyzely_api::models::DeviceRecord;

/// Product categories the sync layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    ContactSensor,
    MotionSensor,
    Light,
    MeshLight,
    Other,
}

impl ProductKind {
    /// Infer the category from the service's `product_type`, falling
    /// back to model-prefix checks for records with a blank or unknown
    /// type field.
    pub fn infer(product_type: &str, product_model: &str) -> Self {
        match product_type {
            "ContactSensor" => Self::ContactSensor,
            "MotionSensor" => Self::MotionSensor,
            "Light" => Self::Light,
            "MeshLight" => Self::MeshLight,
            _ => {
                let model = product_model.to_uppercase();
                if model.starts_with("WLPA19C") {
                    Self::MeshLight
                } else if model.starts_with("WLPA19") {
                    Self::Light
                } else {
                    Self::Other
                }
            }
        }
    }
}

/// One device's state as reported by a single poll.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub mac: String,
    pub product_model: String,
    pub product_type: String,
    pub nickname: Option<String>,
    /// Vendor property code -> raw value.
    pub device_params: Map<String, Value>,
}

impl DeviceSnapshot {
    pub fn kind(&self) -> ProductKind {
        ProductKind::infer(&self.product_type, &self.product_model)
    }

    /// Read a boolean device param. The service is inconsistent about
    /// value types: `1`/`0` numbers, `"1"`/`"0"` strings, and real
    /// booleans all appear in the wild.
    pub fn param_bool(&self, key: &str) -> Option<bool> {
        match self.device_params.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => Some(n.as_i64()? != 0),
            Value::String(s) => Some(s != "0" && !s.is_empty()),
            _ => None,
        }
    }
}

impl From<DeviceRecord> for DeviceSnapshot {
    fn from(record: DeviceRecord) -> Self {
        Self {
            mac: record.mac,
            product_model: record.product_model,
            product_type: record.product_type,
            nickname: record.nickname,
            device_params: record.device_params,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn snapshot(params: Value) -> DeviceSnapshot {
        let Value::Object(device_params) = params else {
            panic!("params must be an object");
        };
        DeviceSnapshot {
            mac: "ABC123".into(),
            product_model: "WLPA19".into(),
            product_type: "Light".into(),
            nickname: None,
            device_params,
        }
    }

    #[test]
    fn kind_follows_product_type() {
        assert_eq!(ProductKind::infer("MeshLight", ""), ProductKind::MeshLight);
        assert_eq!(
            ProductKind::infer("ContactSensor", ""),
            ProductKind::ContactSensor
        );
        assert_eq!(ProductKind::infer("Camera", "WYZEC1"), ProductKind::Other);
        assert_eq!(snapshot(json!({})).kind(), ProductKind::Light);
    }

    #[test]
    fn kind_falls_back_to_model_prefix() {
        assert_eq!(ProductKind::infer("", "WLPA19C"), ProductKind::MeshLight);
        assert_eq!(ProductKind::infer("", "wlpa19"), ProductKind::Light);
    }

    #[test]
    fn param_bool_accepts_the_service_value_zoo() {
        let snap = snapshot(json!({
            "a": 1, "b": 0, "c": "1", "d": "0", "e": true, "f": [1]
        }));
        assert_eq!(snap.param_bool("a"), Some(true));
        assert_eq!(snap.param_bool("b"), Some(false));
        assert_eq!(snap.param_bool("c"), Some(true));
        assert_eq!(snap.param_bool("d"), Some(false));
        assert_eq!(snap.param_bool("e"), Some(true));
        assert_eq!(snap.param_bool("f"), None);
        assert_eq!(snap.param_bool("missing"), None);
    }
}

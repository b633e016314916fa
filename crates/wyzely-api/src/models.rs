// Wire models for the Wyze cloud API.
//
// Fields use `#[serde(default)]` liberally because the service is
// inconsistent about field presence across firmware and app versions.

use serde::{Deserialize, Serialize};

// ── Identity service ─────────────────────────────────────────────────

/// Response from `user/login`, both the initial attempt and the MFA
/// completion. A challenge carries `mfa_details` and no `access_token`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub mfa_details: Option<MfaDetails>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// TOTP challenge details from a login response.
#[derive(Debug, Deserialize)]
pub struct MfaDetails {
    #[serde(default)]
    pub totp_apps: Vec<TotpApp>,
}

/// One registered TOTP app; `app_id` is the verification id the MFA
/// completion request must echo back.
#[derive(Debug, Deserialize)]
pub struct TotpApp {
    pub app_id: String,
}

/// The access/refresh token pair. Always replaced as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

// ── Device service ───────────────────────────────────────────────────

/// One device from `app/v2/home_page/get_object_list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: String,
    #[serde(default)]
    pub product_model: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub nickname: Option<String>,
    /// Vendor property code -> raw value, as reported by the poll.
    #[serde(default)]
    pub device_params: serde_json::Map<String, serde_json::Value>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `data` payload of `get_object_list`.
#[derive(Debug, Deserialize)]
pub struct ObjectList {
    #[serde(default)]
    pub device_list: Vec<DeviceRecord>,
}

/// One property from `app/v2/device/get_property_list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub pid: String,
    #[serde(default)]
    pub value: String,
}

/// `data` payload of `get_property_list`.
#[derive(Debug, Deserialize)]
pub struct PropertyList {
    #[serde(default)]
    pub property_list: Vec<Property>,
}

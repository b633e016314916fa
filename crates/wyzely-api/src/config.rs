// ── Runtime connection configuration ──
//
// These types describe *how* to reach the Wyze cloud. They carry
// credential data and app-identity constants, but never touch disk;
// the host plugin constructs them and hands them in.

use std::path::PathBuf;

use secrecy::SecretString;
use url::Url;

use crate::envelope::AppIdentity;
use crate::generation::ApiGeneration;
use crate::transport::TransportConfig;

/// Account credentials.
///
/// The MFA code is single-use: it answers one TOTP challenge during
/// login and is never stored anywhere else.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    pub mfa_code: Option<String>,
}

/// Configuration for one API session.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Identity service root (hosts `user/login`).
    pub auth_base_url: Url,
    /// Device service root (hosts the `app/v2/` endpoints).
    pub api_base_url: Url,
    /// API key attached as `x-api-key` to identity requests.
    pub auth_api_key: String,
    /// App-emulation identity fields.
    pub app: AppIdentity,
    /// Which server generation to speak (login field naming + hash depth).
    pub generation: ApiGeneration,
    /// Transport tuning for the shared HTTP client.
    pub transport: TransportConfig,
    /// Override for the token-cache directory. Defaults to the platform
    /// data dir.
    pub token_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://auth-prod.api.wyze.com"
                .parse()
                .expect("valid default auth URL"),
            api_base_url: "https://api.wyzecam.com"
                .parse()
                .expect("valid default API URL"),
            auth_api_key: "WMXHYf79Nr5gIlt3r0r7p9Tcw5bvs6BB4U8O8nGJ".into(),
            app: AppIdentity::default(),
            generation: ApiGeneration::default(),
            transport: TransportConfig::default(),
            token_dir: None,
        }
    }
}

// Session management for the Wyze cloud API.
//
// Owns the credentials, the token pair, and the retry ladder around
// every authenticated call. Login and refresh are serialized behind a
// single guard so overlapping failures trigger exactly one
// re-authentication; callers queued behind it reuse the winner's
// tokens instead of starting their own.

use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::{ApiConfig, Credentials};
use crate::envelope::{preview, unwrap_envelope};
use crate::error::Error;
use crate::models::{LoginResponse, TokenPair};
use crate::token_store::TokenStore;

const LOGIN_PATH: &str = "user/login";
const REFRESH_PATH: &str = "app/user/refresh_token";

/// Authenticated access to the Wyze cloud.
///
/// One instance per account, shared (behind `Arc`) by every accessory.
/// The token pair is the only shared mutable state; it is replaced
/// atomically so readers never observe a half-updated pair.
pub struct SessionManager {
    http: reqwest::Client,
    config: ApiConfig,
    credentials: Credentials,
    tokens: RwLock<Option<TokenPair>>,
    /// Serializes login and refresh. Held only while re-authenticating,
    /// never across ordinary device calls.
    auth_guard: Mutex<()>,
    store: TokenStore,
    store_checked: AtomicBool,
}

impl SessionManager {
    pub fn new(config: ApiConfig, credentials: Credentials) -> Result<Self, Error> {
        let http = config.transport.build_client()?;
        let store = TokenStore::for_account(&credentials.username, config.token_dir.as_deref());
        Ok(Self {
            http,
            config,
            credentials,
            tokens: RwLock::new(None),
            auth_guard: Mutex::new(()),
            store,
            store_checked: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The currently held access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    // ── Authenticated calls ──────────────────────────────────────────

    /// Issue an authenticated POST to the device service.
    ///
    /// Ensures a token exists (persisted pair, else login), issues the
    /// call, and on failure climbs the retry ladder: one refresh-token
    /// exchange followed by one retry, then one full login followed by
    /// one final retry. Anything after that propagates to the caller.
    pub async fn authenticated_call(&self, path: &str, fields: Value) -> Result<Value, Error> {
        let token = self.ensure_token().await?;
        let first_err = match self.perform(path, &fields, &token).await {
            Ok(data) => return Ok(data),
            Err(e) => e,
        };
        debug!(path, error = %first_err, "request failed; attempting token refresh");

        let mut last_used = token;
        match self.refresh_or_reuse(&last_used).await {
            Ok(refreshed) => {
                last_used = refreshed;
                match self.perform(path, &fields, &last_used).await {
                    Ok(data) => return Ok(data),
                    Err(e) => {
                        debug!(path, error = %e, "retry after refresh failed; performing full login");
                    }
                }
            }
            Err(e) => debug!(path, error = %e, "refresh failed; performing full login"),
        }

        let fresh = self.login_or_reuse(&last_used).await?;
        self.perform(path, &fields, &fresh).await
    }

    /// Issue a single enveloped POST without any retry handling.
    async fn perform(&self, path: &str, fields: &Value, access_token: &str) -> Result<Value, Error> {
        let mut body = self.config.app.envelope(access_token);
        if let Some(extra) = fields.as_object() {
            for (key, value) in extra {
                body.insert(key.clone(), value.clone());
            }
        }

        let url = self.config.api_base_url.join(path)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "access token rejected (HTTP 401)".into(),
            });
        }
        let resp = resp.error_for_status()?;

        let text = resp.text().await?;
        unwrap_envelope(&text)
    }

    // ── Token lifecycle ──────────────────────────────────────────────

    /// A usable access token: in memory, else the persisted pair
    /// (checked once per process), else a fresh login.
    async fn ensure_token(&self) -> Result<String, Error> {
        if let Some(pair) = self.tokens.read().await.as_ref() {
            return Ok(pair.access_token.clone());
        }

        let _guard = self.auth_guard.lock().await;
        if let Some(pair) = self.tokens.read().await.as_ref() {
            return Ok(pair.access_token.clone());
        }

        if !self.store_checked.swap(true, Ordering::SeqCst) {
            if let Some(pair) = self.store.load() {
                debug!(path = %self.store.path().display(), "reusing persisted token pair");
                let token = pair.access_token.clone();
                *self.tokens.write().await = Some(pair);
                return Ok(token);
            }
        }

        self.do_login().await?;
        self.current_token().await
    }

    async fn current_token(&self) -> Result<String, Error> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.access_token.clone())
            .ok_or_else(|| Error::Authentication {
                message: "no access token after authentication".into(),
            })
    }

    /// Exchange the refresh token under the auth guard. If another
    /// caller already replaced the pair while we waited, reuse its
    /// result instead of starting a second exchange.
    async fn refresh_or_reuse(&self, stale: &str) -> Result<String, Error> {
        let _guard = self.auth_guard.lock().await;
        if let Some(pair) = self.tokens.read().await.as_ref() {
            if pair.access_token != stale {
                debug!("token pair already replaced by a concurrent caller");
                return Ok(pair.access_token.clone());
            }
        }
        self.do_refresh().await?;
        self.current_token().await
    }

    /// Full login under the auth guard, with the same reuse rule as
    /// [`refresh_or_reuse`](Self::refresh_or_reuse).
    async fn login_or_reuse(&self, stale: &str) -> Result<String, Error> {
        let _guard = self.auth_guard.lock().await;
        if let Some(pair) = self.tokens.read().await.as_ref() {
            if pair.access_token != stale {
                debug!("token pair already replaced by a concurrent caller");
                return Ok(pair.access_token.clone());
            }
        }
        self.do_login().await?;
        self.current_token().await
    }

    /// Force a full login, replacing any cached token pair.
    pub async fn login(&self) -> Result<(), Error> {
        let _guard = self.auth_guard.lock().await;
        self.do_login().await
    }

    /// Exchange the refresh token for a new pair. On failure the
    /// existing tokens are left untouched so the caller can fall back
    /// to a full login.
    pub async fn refresh(&self) -> Result<(), Error> {
        let _guard = self.auth_guard.lock().await;
        self.do_refresh().await
    }

    // ── Identity service ─────────────────────────────────────────────

    async fn do_login(&self) -> Result<(), Error> {
        let generation = self.config.generation;
        let hashed = generation.hash_password(self.credentials.password.expose_secret());
        let body = json!({
            (generation.login_field()): self.credentials.username,
            "password": hashed,
        });

        let mut response = self.perform_login_request(&body).await?;

        if response.access_token.is_none() {
            // TOTP challenge: answer it with the configured code, or
            // fail telling the caller which credential field is missing.
            let Some(details) = response.mfa_details else {
                return Err(Error::Authentication {
                    message: "login response carried neither a token nor an MFA challenge".into(),
                });
            };
            let Some(code) = self.credentials.mfa_code.as_deref() else {
                return Err(Error::MfaRequired);
            };
            let app = details
                .totp_apps
                .first()
                .ok_or_else(|| Error::Authentication {
                    message: "MFA challenge without a registered TOTP app".into(),
                })?;

            debug!(verification_id = %app.app_id, "answering TOTP challenge");
            let body = json!({
                (generation.login_field()): self.credentials.username,
                "password": hashed,
                "mfa_type": "TotpVerificationCode",
                "verification_id": app.app_id,
                "verification_code": code,
            });
            response = self.perform_login_request(&body).await?;
        }

        let (Some(access_token), Some(refresh_token)) =
            (response.access_token, response.refresh_token)
        else {
            return Err(Error::Authentication {
                message: "login succeeded but the response carried no token pair".into(),
            });
        };

        self.replace_tokens(TokenPair {
            access_token,
            refresh_token,
        })
        .await;
        info!("logged into the Wyze API");
        Ok(())
    }

    async fn perform_login_request(&self, body: &Value) -> Result<LoginResponse, Error> {
        let url = self.config.auth_base_url.join(LOGIN_PATH)?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .header("x-api-key", &self.config.auth_api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&text)),
            });
        }

        let parsed: LoginResponse =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&text)),
                body: text.clone(),
            })?;
        if let Some(msg) = parsed.msg.as_deref().filter(|m| !m.is_empty()) {
            return Err(Error::Authentication {
                message: msg.to_owned(),
            });
        }
        Ok(parsed)
    }

    async fn do_refresh(&self) -> Result<(), Error> {
        let current = self
            .tokens
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Authentication {
                message: "no refresh token to exchange".into(),
            })?;

        let mut body = self.config.app.envelope(&current.access_token);
        body.insert(
            "refresh_token".into(),
            Value::String(current.refresh_token.clone()),
        );

        let url = self.config.api_base_url.join(REFRESH_PATH)?;
        debug!("POST {}", url);

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("refresh rejected (HTTP {status})"),
            });
        }

        let text = resp.text().await?;
        let data = unwrap_envelope(&text).map_err(|e| match e {
            // A semantic rejection of the refresh token means the
            // caller should fall back to a full login.
            Error::Api { message } => Error::Authentication {
                message: format!("refresh rejected: {message}"),
            },
            other => other,
        })?;

        let pair: TokenPair =
            serde_json::from_value(data.clone()).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: data.to_string(),
            })?;
        self.replace_tokens(pair).await;
        debug!("token pair refreshed");
        Ok(())
    }

    /// Replace both tokens in one write and persist the new pair. The
    /// persistence write completes (or warns) before this returns so a
    /// process exit right after cannot lose a freshly issued token.
    async fn replace_tokens(&self, pair: TokenPair) {
        self.store.save(&pair);
        *self.tokens.write().await = Some(pair);
    }
}

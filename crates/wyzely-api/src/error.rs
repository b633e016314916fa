use thiserror::Error;

/// Top-level error type for the `wyzely-api` crate.
///
/// Covers every failure mode across the identity and device surfaces.
/// `wyzely-core` maps these into domain-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or refresh rejected by the identity service.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The account has a TOTP challenge enabled and no code was supplied.
    #[error("Multi-factor authentication required -- supply the `mfa_code` credential field")]
    MfaRequired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, non-2xx status, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Device API ──────────────────────────────────────────────────
    /// Semantic failure reported inside a 2xx payload's `msg` field
    /// (stale token, invalid device, etc.)
    #[error("Device API error: {message}")]
    Api { message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

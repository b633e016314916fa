// ── Core error types ──
//
// Domain-facing errors from wyzely-core. Consumers never see HTTP
// status codes or JSON parse failures directly; the
// `From<wyzely_api::Error>` impl translates the wire-level taxonomy
// into domain-appropriate variants.

use thiserror::Error;

use crate::color::ColorError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Multi-factor authentication required -- supply the `mfa_code` credential field")]
    MfaRequired,

    /// The service rejected the operation inside a 2xx payload.
    #[error("Device API error: {message}")]
    Api { message: String },

    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Malformed color value: {0}")]
    Color(#[from] ColorError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from wire-level errors ────────────────────────────────

impl From<wyzely_api::Error> for CoreError {
    fn from(err: wyzely_api::Error) -> Self {
        match err {
            wyzely_api::Error::Authentication { message } => Self::AuthenticationFailed { message },
            wyzely_api::Error::MfaRequired => Self::MfaRequired,
            wyzely_api::Error::Api { message } => Self::Api { message },
            wyzely_api::Error::Transport(e) => Self::ConnectionFailed {
                reason: e.to_string(),
            },
            wyzely_api::Error::InvalidUrl(e) => Self::Internal(format!("invalid URL: {e}")),
            wyzely_api::Error::Deserialization { message, .. } => {
                Self::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}

// ── Core error types ──
//
// User-facing errors from roundtable-core. These are NOT wire-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<roundtable_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    /// The server refused the operation; the message is shown verbatim.
    #[error("Operation rejected by server: {message}")]
    Rejected { message: String },

    /// Transport or 5xx failure on a user-initiated action. Retryable.
    #[error("Request failed: {message}")]
    Network { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when retrying the same operation may succeed --
    /// the CLI attaches a retry affordance to these, and poll loops
    /// simply wait for the next cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::ConnectionFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<roundtable_api::Error> for CoreError {
    fn from(err: roundtable_api::Error) -> Self {
        match err {
            roundtable_api::Error::InvalidInput { field, reason } => {
                CoreError::InvalidInput { field, reason }
            }
            roundtable_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            roundtable_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "bearer token missing, expired, or invalid".into(),
            },
            roundtable_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Network {
                        message: e.to_string(),
                    }
                }
            }
            roundtable_api::Error::Rejected { message, status } => {
                if status == 404 {
                    CoreError::NotFound {
                        entity: "resource",
                        identifier: message,
                    }
                } else if status >= 500 {
                    CoreError::Network { message }
                } else {
                    CoreError::Rejected { message }
                }
            }
            roundtable_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

use thiserror::Error;

/// Top-level error type for the `roundtable-api` crate.
///
/// Covers every failure mode at the HTTP boundary. `roundtable-core` maps
/// these into user-facing diagnostics; nothing above the core layer sees a
/// raw status code or JSON parse failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request construction ────────────────────────────────────────
    /// A required identifier was missing or blank. Checked before any
    /// network traffic happens.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Server responses ────────────────────────────────────────────
    /// Bearer token rejected (401).
    #[error("Unauthorized -- bearer token missing, expired, or invalid")]
    Unauthorized,

    /// The server refused the request, either with a non-success HTTP
    /// status or a `success: false` envelope. Carries the server-provided
    /// message so it can be shown to the user verbatim.
    #[error("Server rejected request (HTTP {status}): {message}")]
    Rejected { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle rather than surfacing to the user.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" response.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Rejected { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if re-authentication might resolve the failure.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

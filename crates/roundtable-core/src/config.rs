// ── Runtime client configuration ──
//
// These types describe *how* to talk to the platform: server, identity,
// and every timing knob the reconciliation loops use. They carry
// credential data and tuning, but never touch disk. The CLI constructs a
// `ClientConfig` from roundtable-config and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::UserId;

/// Connection + identity configuration for the client layer.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root URL (the `/api/gd` prefix is appended per request).
    pub server_url: Url,
    /// Bearer token for the `Authorization` header.
    pub bearer_token: Option<SecretString>,
    /// The acting user. QR and session snapshots are cached per
    /// `(entity, user)` so two accounts on one machine never collide.
    pub user_id: UserId,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Reconciliation timing knobs.
    pub timing: Timing,
}

/// Every interval, tolerance, and fallback duration used by the
/// reconciliation loops.
///
/// Phase durations are normally server-sourced (session rules); the
/// `fallback_*` values only apply when the server cannot be reached.
/// They are configuration, not behavior -- nothing in the engine embeds
/// a literal duration.
#[derive(Debug, Clone)]
pub struct Timing {
    /// QR usage poll cadence while a QR screen is active.
    pub qr_poll_interval: Duration,
    /// Phase/remaining-time resync cadence during a session.
    pub resync_interval: Duration,
    /// Lobby ready-status poll cadence.
    pub ready_poll_interval: Duration,
    /// Lobby participants poll cadence.
    pub participants_poll_interval: Duration,
    /// Local countdown drift beyond which a server read overwrites it.
    pub drift_tolerance: Duration,
    /// Grace countdown between "ready" and session start.
    pub lobby_countdown: Duration,
    /// Per-question answer window in the peer survey.
    pub survey_question_window: Duration,
    /// Prep-phase duration when the server has no rules for the session.
    pub fallback_prep: Duration,
    /// Discussion-phase duration fallback.
    pub fallback_discussion: Duration,
    /// Survey-phase duration fallback.
    pub fallback_survey: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            qr_poll_interval: Duration::from_secs(3),
            resync_interval: Duration::from_secs(10),
            ready_poll_interval: Duration::from_secs(3),
            participants_poll_interval: Duration::from_secs(5),
            drift_tolerance: Duration::from_secs(2),
            lobby_countdown: Duration::from_secs(120),
            survey_question_window: Duration::from_secs(30),
            fallback_prep: Duration::from_secs(5 * 60),
            fallback_discussion: Duration::from_secs(20 * 60),
            fallback_survey: Duration::from_secs(5 * 60),
        }
    }
}

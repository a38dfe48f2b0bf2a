// Wire types for the GD platform API.
//
// Field names mirror the backend's JSON exactly (snake_case, RFC 3339
// timestamps). `#[serde(default)]` is used liberally because the backend
// is inconsistent about field presence -- older rows omit flags that newer
// handlers always emit.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Admission QR codes ───────────────────────────────────────────────

/// Response from `GET /admin/qr` -- the venue's current admission QR,
/// freshly created or fetched from the active pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrIssued {
    pub qr_id: String,
    /// Opaque payload rendered into the QR image by the caller.
    pub qr_string: String,
    pub expires_at: DateTime<Utc>,
    pub max_capacity: u32,
    #[serde(default)]
    pub current_usage: u32,
    #[serde(default)]
    pub remaining_slots: u32,
    /// `true` when the server minted a new code for this request.
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub qr_group_id: Option<String>,
}

/// One entry from the usage listing at `GET /admin/qr/manage`.
///
/// The listing is a bare array covering every QR the venue has issued;
/// pollers locate their current code by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrUsageRecord {
    pub id: String,
    pub max_capacity: u32,
    #[serde(default)]
    pub current_usage: u32,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One entry from `GET /admin/qr/history` (`{success, data, count}` envelope),
/// ordered newest-first by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrHistoryRecord {
    pub id: String,
    pub qr_data: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub max_capacity: u32,
    #[serde(default)]
    pub current_usage: u32,
    #[serde(default)]
    pub remaining: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub is_expired: bool,
    #[serde(default)]
    pub qr_group_id: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

// ── Session phase & timer ────────────────────────────────────────────

/// Response from `GET /student/session/phase`.
///
/// Either `end_time` or `remaining_seconds` may be present depending on
/// backend version; callers prefer `end_time` when both exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseRead {
    pub phase: String,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remaining_seconds: Option<u64>,
}

/// Response from `POST /student/session/phase/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseAdvance {
    /// The phase the session is now in.
    pub phase: String,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
    /// `true` once the session has no further timed phase.
    #[serde(default)]
    pub completed: bool,
}

/// Response from `GET|POST /student/session/timer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRead {
    #[serde(default)]
    pub active: bool,
    pub phase: String,
    pub remaining_seconds: u64,
}

/// Request body for `POST /student/session/timer`.
#[derive(Debug, Clone, Serialize)]
pub struct TimerStart<'a> {
    pub session_id: &'a str,
    pub phase: &'a str,
    pub duration_seconds: u64,
}

/// Response from `GET /student/session/rules`.
///
/// Durations are minutes. All optional: missing fields fall back to the
/// configured defaults in the core layer, never to literals here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRulesRead {
    #[serde(default)]
    pub prep_time: Option<u64>,
    #[serde(default)]
    pub discussion_time: Option<u64>,
    #[serde(default)]
    pub survey_time: Option<u64>,
    #[serde(default)]
    pub level: Option<u32>,
}

// ── Lobby ────────────────────────────────────────────────────────────

/// One participant from `GET /student/session/participants` (`{data}` envelope).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, rename = "profileImage")]
    pub profile_image: Option<String>,
}

/// One entry from `GET /student/session/ready-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyStatusRecord {
    pub student_id: String,
    #[serde(default)]
    pub is_ready: bool,
}

/// Full ready-status response: `{ ready_statuses: [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadyStatusRead {
    #[serde(default)]
    pub ready_statuses: Vec<ReadyStatusRecord>,
}

/// Response from `GET /student/session/check-all-ready`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllReadyRead {
    #[serde(default)]
    pub all_ready: bool,
}

/// Request body for `POST /student/session/ready`.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyUpdate<'a> {
    pub session_id: &'a str,
    pub is_ready: bool,
}

// ── Survey ───────────────────────────────────────────────────────────

/// One peer-evaluation question from `GET /student/questions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub text: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Request body for `POST /student/survey`.
///
/// `responses` maps 1-based question number to rank → member id.
#[derive(Debug, Clone, Serialize)]
pub struct SurveySubmission<'a> {
    pub session_id: &'a str,
    pub responses: BTreeMap<u32, BTreeMap<u8, String>>,
    pub is_partial: bool,
    pub is_final: bool,
}

/// Request body for `POST /student/survey/apply-penalty`.
#[derive(Debug, Clone, Serialize)]
pub struct PenaltyRequest<'a> {
    pub session_id: &'a str,
    pub question_id: u32,
    pub student_id: &'a str,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

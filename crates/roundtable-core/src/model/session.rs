// ── Session phase domain types ──

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config::Timing;

/// The timed phases of a discussion session, in order.
///
/// The derived ordering backs the monotonicity invariant: the engine
/// never moves to a phase that compares less than the current one, no
/// matter what a (stale) server read claims.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SessionPhase {
    Prep,
    Discussion,
    Survey,
    Completed,
}

impl SessionPhase {
    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Prep => Some(Self::Discussion),
            Self::Discussion => Some(Self::Survey),
            Self::Survey => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Whether the timed portion of the session is over. Reaching the
    /// survey means the phase engine is done and the caller moves on to
    /// the peer-evaluation flow.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Survey | Self::Completed)
    }
}

/// Per-session phase durations, normally server-sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRules {
    pub prep: Duration,
    pub discussion: Duration,
    pub survey: Duration,
    pub level: u32,
}

impl SessionRules {
    /// Rules built entirely from configured fallbacks, for when the
    /// rules endpoint is unreachable.
    pub fn fallback(timing: &Timing) -> Self {
        Self {
            prep: timing.fallback_prep,
            discussion: timing.fallback_discussion,
            survey: timing.fallback_survey,
            level: 1,
        }
    }

    pub fn duration_for(&self, phase: SessionPhase) -> Duration {
        match phase {
            SessionPhase::Prep => self.prep,
            SessionPhase::Discussion => self.discussion,
            SessionPhase::Survey => self.survey,
            SessionPhase::Completed => Duration::ZERO,
        }
    }
}

/// One participant in the session lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: super::ids::UserId,
    pub name: String,
    pub department: Option<String>,
}

/// A participant's readiness flag in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyState {
    pub student_id: super::ids::UserId,
    pub is_ready: bool,
}

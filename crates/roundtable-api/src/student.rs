// Student endpoints: session phase/timer, lobby readiness, and the
// peer-evaluation survey.

use std::collections::BTreeMap;

use crate::client::GdClient;
use crate::error::Error;
use crate::types::{
    AllReadyRead, ParticipantRecord, PenaltyRequest, PhaseAdvance, PhaseRead, QuestionRecord,
    ReadyStatusRead, ReadyUpdate, SessionRulesRead, SurveySubmission, TimerRead, TimerStart,
};

impl GdClient {
    // ── Session phase & timer ────────────────────────────────────────

    /// Read the session's authoritative phase and end time.
    pub async fn session_phase(&self, session_id: &str) -> Result<PhaseRead, Error> {
        Self::require_id("session_id", session_id)?;
        self.get(
            "student/session/phase",
            &[("session_id", session_id.to_owned())],
        )
        .await
    }

    /// Ask the server to advance to the next phase. The response is
    /// authoritative for both the new phase and its duration.
    pub async fn complete_phase(&self, session_id: &str) -> Result<PhaseAdvance, Error> {
        Self::require_id("session_id", session_id)?;
        self.post(
            "student/session/phase/complete",
            &serde_json::json!({ "session_id": session_id }),
        )
        .await
    }

    /// Read the server-side phase timer, or `None` when the session has
    /// no timer yet.
    pub async fn session_timer(&self, session_id: &str) -> Result<Option<TimerRead>, Error> {
        Self::require_id("session_id", session_id)?;
        let result: Result<TimerRead, Error> = self
            .get(
                "student/session/timer",
                &[("session_id", session_id.to_owned())],
            )
            .await;

        match result {
            Ok(timer) => Ok(Some(timer)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Start a server-side phase timer and adopt the echoed state.
    pub async fn start_timer(
        &self,
        session_id: &str,
        phase: &str,
        duration_seconds: u64,
    ) -> Result<TimerRead, Error> {
        Self::require_id("session_id", session_id)?;
        self.post(
            "student/session/timer",
            &TimerStart {
                session_id,
                phase,
                duration_seconds,
            },
        )
        .await
    }

    /// Per-level session rules (phase durations in minutes).
    pub async fn session_rules(&self, session_id: &str) -> Result<SessionRulesRead, Error> {
        Self::require_id("session_id", session_id)?;
        self.get(
            "student/session/rules",
            &[("session_id", session_id.to_owned())],
        )
        .await
    }

    // ── Lobby ────────────────────────────────────────────────────────

    /// Everyone currently admitted to the session (`{data}` envelope).
    pub async fn participants(&self, session_id: &str) -> Result<Vec<ParticipantRecord>, Error> {
        Self::require_id("session_id", session_id)?;
        self.get(
            "student/session/participants",
            &[("session_id", session_id.to_owned())],
        )
        .await
    }

    /// Per-participant ready flags.
    pub async fn ready_status(&self, session_id: &str) -> Result<ReadyStatusRead, Error> {
        Self::require_id("session_id", session_id)?;
        self.get(
            "student/session/ready-status",
            &[("session_id", session_id.to_owned())],
        )
        .await
    }

    /// Whether every admitted participant has marked ready.
    pub async fn check_all_ready(&self, session_id: &str) -> Result<AllReadyRead, Error> {
        Self::require_id("session_id", session_id)?;
        self.get(
            "student/session/check-all-ready",
            &[("session_id", session_id.to_owned())],
        )
        .await
    }

    /// Publish this student's ready flag.
    pub async fn update_ready(&self, session_id: &str, is_ready: bool) -> Result<(), Error> {
        Self::require_id("session_id", session_id)?;
        self.post_unit(
            "student/session/ready",
            &ReadyUpdate {
                session_id,
                is_ready,
            },
        )
        .await
    }

    // ── Survey ───────────────────────────────────────────────────────

    /// Peer-evaluation questions for a level, optionally scoped to a
    /// session. Bare-array and `{data}` envelopes both occur.
    pub async fn survey_questions(
        &self,
        level: u32,
        session_id: Option<&str>,
    ) -> Result<Vec<QuestionRecord>, Error> {
        let mut query = vec![("level", level.to_string())];
        if let Some(id) = session_id {
            Self::require_id("session_id", id)?;
            query.push(("session_id", id.to_owned()));
        }
        self.get("student/questions", &query).await
    }

    /// Submit one question's rankings (or the final batch).
    pub async fn submit_survey(
        &self,
        session_id: &str,
        responses: BTreeMap<u32, BTreeMap<u8, String>>,
        is_partial: bool,
        is_final: bool,
    ) -> Result<(), Error> {
        Self::require_id("session_id", session_id)?;
        self.post_unit(
            "student/survey",
            &SurveySubmission {
                session_id,
                responses,
                is_partial,
                is_final,
            },
        )
        .await
    }

    /// Arm the server-side answer window for one survey question.
    pub async fn start_question_timer(
        &self,
        session_id: &str,
        question_id: u32,
    ) -> Result<(), Error> {
        Self::require_id("session_id", session_id)?;
        self.post_unit(
            "student/survey/start-question",
            &serde_json::json!({
                "session_id": session_id,
                "question_id": question_id,
            }),
        )
        .await
    }

    /// Record a no-selection penalty for a skipped question.
    pub async fn apply_question_penalty(
        &self,
        session_id: &str,
        question_id: u32,
        student_id: &str,
    ) -> Result<(), Error> {
        Self::require_id("session_id", session_id)?;
        Self::require_id("student_id", student_id)?;
        self.post_unit(
            "student/survey/apply-penalty",
            &PenaltyRequest {
                session_id,
                question_id,
                student_id,
            },
        )
        .await
    }
}

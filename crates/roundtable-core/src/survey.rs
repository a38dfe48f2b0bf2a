// ── Peer-evaluation survey run ──
//
// Walks a participant through the shuffled question list, collecting a
// ranking per question and submitting as it goes. Question order comes
// from the seeded shuffle; an empty selection can only advance by taking
// a penalty, mirroring the platform's scoring rules.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use roundtable_api::GdClient;

use crate::config::Timing;
use crate::error::CoreError;
use crate::model::{RankingSelection, SessionId, SurveyQuestion, UserId};
use crate::shuffle::shuffle_for;

/// Questions used when the server has none for the level. Content
/// matches the platform's seeded defaults.
fn default_questions() -> Vec<SurveyQuestion> {
    [
        ("q1", "Clarity of arguments"),
        ("q2", "Contribution to discussion"),
        ("q3", "Teamwork and collaboration"),
    ]
    .into_iter()
    .map(|(id, text)| SurveyQuestion {
        id: id.to_owned(),
        text: text.to_owned(),
        weight: 1.0,
    })
    .collect()
}

/// Result of confirming the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStep {
    /// Moved on; `index` is the new current question.
    Advanced { index: usize },
    /// Nothing selected and no penalty taken -- the caller must either
    /// collect a selection or call [`SurveyRun::skip_with_penalty`].
    NeedsSelection,
    /// That was the last question; the run is over.
    Completed,
}

/// One participant's pass through the survey.
pub struct SurveyRun {
    client: Arc<GdClient>,
    session_id: SessionId,
    user_id: UserId,
    questions: Vec<SurveyQuestion>,
    selections: Vec<RankingSelection>,
    penalized: Vec<bool>,
    current: usize,
    question_window: Duration,
    question_opened: Instant,
}

impl SurveyRun {
    /// Fetch the level's questions and derive this user's order.
    ///
    /// A failed or empty fetch falls back to the default question set --
    /// the survey must remain usable offline. Same user + same session
    /// always produces the same order.
    pub async fn load(
        client: Arc<GdClient>,
        session_id: SessionId,
        user_id: UserId,
        level: u32,
        timing: &Timing,
    ) -> Self {
        let mut questions = match client
            .survey_questions(level, Some(session_id.as_str()))
            .await
        {
            Ok(records) if !records.is_empty() => {
                records.into_iter().map(SurveyQuestion::from).collect()
            }
            Ok(_) => {
                debug!(session = %session_id, "no questions for level, using defaults");
                default_questions()
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "question fetch failed, using defaults");
                default_questions()
            }
        };

        shuffle_for(&mut questions, &user_id, &session_id);

        let count = questions.len();
        let mut run = Self {
            client,
            session_id,
            user_id,
            questions,
            selections: vec![RankingSelection::default(); count],
            penalized: vec![false; count],
            current: 0,
            question_window: timing.survey_question_window,
            question_opened: Instant::now(),
        };
        run.open_current_question().await;
        run
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn questions(&self) -> &[SurveyQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&SurveyQuestion> {
        self.questions.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Time left in the current question's answer window.
    pub fn question_time_left(&self) -> Duration {
        self.question_window
            .saturating_sub(self.question_opened.elapsed())
    }

    pub fn current_selection(&self) -> Option<&RankingSelection> {
        self.selections.get(self.current)
    }

    // ── Ranking ──────────────────────────────────────────────────────

    /// Rank a member for the current question. Displaces any previous
    /// holder of the rank and any previous rank of the member.
    pub fn select(&mut self, rank: u8, member: UserId) -> bool {
        if member == self.user_id {
            // Nobody ranks themselves.
            return false;
        }
        match self.selections.get_mut(self.current) {
            Some(selection) => selection.assign(rank, member),
            None => false,
        }
    }

    pub fn clear_rank(&mut self, rank: u8) {
        if let Some(selection) = self.selections.get_mut(self.current) {
            selection.clear_rank(rank);
        }
    }

    // ── Progression ──────────────────────────────────────────────────

    /// Submit the current question's rankings and move on.
    ///
    /// An empty selection does not advance unless a penalty has been
    /// taken for the question -- the caller decides by invoking
    /// [`skip_with_penalty`](Self::skip_with_penalty).
    pub async fn confirm_current(&mut self) -> Result<SurveyStep, CoreError> {
        if self.is_finished() {
            return Ok(SurveyStep::Completed);
        }

        let selection = self
            .selections
            .get(self.current)
            .cloned()
            .unwrap_or_default();
        let penalized = self.penalized.get(self.current).copied().unwrap_or(false);

        if selection.is_empty() && !penalized {
            return Ok(SurveyStep::NeedsSelection);
        }

        if !selection.is_empty() {
            let question_number = self.question_number();
            let is_final = self.current + 1 == self.questions.len();

            let mut responses = BTreeMap::new();
            responses.insert(question_number, selection.to_wire());

            self.client
                .submit_survey(self.session_id.as_str(), responses, !is_final, is_final)
                .await?;
        }

        Ok(self.advance().await)
    }

    /// Take the no-selection penalty for the current question and move on.
    pub async fn skip_with_penalty(&mut self) -> Result<SurveyStep, CoreError> {
        if self.is_finished() {
            return Ok(SurveyStep::Completed);
        }

        let question_number = self.question_number();
        self.client
            .apply_question_penalty(
                self.session_id.as_str(),
                question_number,
                self.user_id.as_str(),
            )
            .await?;

        if let Some(flag) = self.penalized.get_mut(self.current) {
            *flag = true;
        }
        Ok(self.advance().await)
    }

    /// 1-based number of the current question, as the wire expects.
    fn question_number(&self) -> u32 {
        u32::try_from(self.current + 1).unwrap_or(u32::MAX)
    }

    async fn advance(&mut self) -> SurveyStep {
        self.current += 1;
        if self.is_finished() {
            SurveyStep::Completed
        } else {
            self.open_current_question().await;
            SurveyStep::Advanced {
                index: self.current,
            }
        }
    }

    /// Arm the server-side answer window; failure is non-fatal (the
    /// local window still runs).
    async fn open_current_question(&mut self) {
        self.question_opened = Instant::now();
        if let Err(e) = self
            .client
            .start_question_timer(self.session_id.as_str(), self.question_number())
            .await
        {
            debug!(session = %self.session_id, error = %e,
                "question timer start failed, keeping local window");
        }
    }
}

// ── Phase countdown clock ──
//
// Deadline-based: remaining time is always recomputed from the wall
// clock, never from tick counts, so a countdown that slept through an
// app suspension is correct the moment it is read again. The server is
// the source of truth; the local deadline is UI smoothing between
// resyncs.

use std::time::{Duration, Instant};

use crate::model::SessionPhase;

/// Countdown state for the session's current phase.
#[derive(Debug, Clone)]
pub struct PhaseClock {
    phase: SessionPhase,
    deadline: Instant,
}

/// What applying a server read did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerApply {
    /// The server moved the session to a later phase.
    Advanced {
        from: SessionPhase,
        to: SessionPhase,
    },
    /// Same phase, but local drift exceeded tolerance; the countdown
    /// was overwritten with the server's remaining time.
    Corrected { drift: Duration },
    /// Same phase, drift within tolerance; local countdown kept.
    InTolerance,
    /// The server reported an earlier phase than the one already
    /// observed. Phases never regress, so the read was discarded.
    RegressionRejected { reported: SessionPhase },
}

impl PhaseClock {
    pub fn start(phase: SessionPhase, remaining: Duration) -> Self {
        Self {
            phase,
            deadline: Instant::now() + remaining,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whole seconds left, rounded up so a freshly synced countdown
    /// displays its full value.
    pub fn remaining_seconds(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == Duration::ZERO
    }

    /// Reconcile against a server-reported `(phase, remaining)`.
    ///
    /// Server state always wins on conflict, with two qualifications:
    /// a phase earlier than the current one is rejected (monotonicity),
    /// and a same-phase remaining within `tolerance` of the local value
    /// is ignored to keep the displayed countdown from stuttering.
    pub fn apply_server(
        &mut self,
        phase: SessionPhase,
        remaining: Duration,
        tolerance: Duration,
    ) -> ServerApply {
        use std::cmp::Ordering;

        match phase.cmp(&self.phase) {
            Ordering::Less => ServerApply::RegressionRejected { reported: phase },
            Ordering::Greater => {
                let from = self.phase;
                self.phase = phase;
                self.deadline = Instant::now() + remaining;
                ServerApply::Advanced { from, to: phase }
            }
            Ordering::Equal => {
                let local = self.remaining();
                let drift = if local > remaining {
                    local - remaining
                } else {
                    remaining - local
                };

                if drift > tolerance {
                    self.deadline = Instant::now() + remaining;
                    ServerApply::Corrected { drift }
                } else {
                    ServerApply::InTolerance
                }
            }
        }
    }
}

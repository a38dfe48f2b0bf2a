// ── Session phase/timer engine ──
//
// Drives the prep → discussion → survey countdown for one session,
// reconciling against the server on an interval and on foreground
// resume. The server is authoritative for phase and remaining time;
// the local clock only smooths the display between resyncs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roundtable_api::GdClient;

use crate::cache::SnapshotCache;
use crate::config::Timing;
use crate::convert::{parse_phase, rules_from_wire};
use crate::error::CoreError;
use crate::model::{SessionId, SessionPhase, SessionRules, UserId};
use crate::poll::PollingSession;
use crate::stream::StateStream;

use super::clock::{PhaseClock, ServerApply};

/// What a resync cycle did. Transient failures are absorbed here, never
/// surfaced -- the next cycle retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    Applied(ServerApply),
    Skipped,
}

/// Client-side phase/timer state machine for one session.
///
/// Cheaply cloneable; all clones share state. Construct, `initialize()`,
/// then either drive manually (`resync_once`, `complete_phase`) or let
/// `spawn()` run the tick and resync loops.
#[derive(Clone)]
pub struct SessionEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    client: Arc<GdClient>,
    cache: Arc<SnapshotCache>,
    session_id: SessionId,
    user_id: UserId,
    timing: Timing,
    state: Mutex<EngineState>,
    phase_tx: watch::Sender<SessionPhase>,
    remaining_tx: watch::Sender<u64>,
    /// Guard so racing expiry callbacks cannot double-fire completion.
    completing: AtomicBool,
}

struct EngineState {
    clock: Option<PhaseClock>,
    rules: SessionRules,
}

impl SessionEngine {
    pub fn new(
        client: Arc<GdClient>,
        cache: Arc<SnapshotCache>,
        session_id: SessionId,
        user_id: UserId,
        timing: Timing,
    ) -> Self {
        let rules = SessionRules::fallback(&timing);
        let (phase_tx, _) = watch::channel(SessionPhase::Prep);
        let (remaining_tx, _) = watch::channel(0);

        Self {
            inner: Arc::new(EngineInner {
                client,
                cache,
                session_id,
                user_id,
                timing,
                state: Mutex::new(EngineState { clock: None, rules }),
                phase_tx,
                remaining_tx,
                completing: AtomicBool::new(false),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn session_id(&self) -> &SessionId {
        &self.inner.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        *self.inner.phase_tx.borrow()
    }

    pub fn remaining(&self) -> Duration {
        self.state()
            .clock
            .as_ref()
            .map(PhaseClock::remaining)
            .unwrap_or_default()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state()
            .clock
            .as_ref()
            .map(PhaseClock::remaining_seconds)
            .unwrap_or_default()
    }

    pub fn is_expired(&self) -> bool {
        self.state()
            .clock
            .as_ref()
            .is_some_and(PhaseClock::is_expired)
    }

    pub fn rules(&self) -> SessionRules {
        self.state().rules
    }

    pub fn subscribe_phase(&self) -> StateStream<SessionPhase> {
        StateStream::new(self.inner.phase_tx.subscribe())
    }

    pub fn subscribe_remaining(&self) -> StateStream<u64> {
        StateStream::new(self.inner.remaining_tx.subscribe())
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Adopt or create the session's server-side timer.
    ///
    /// A fresh engine means a freshly opened session, so any cached
    /// snapshot for this id is discarded first -- stale state from an
    /// earlier visit must not leak into a new run. If the server has an
    /// active timer its `(phase, remaining)` is adopted; otherwise a
    /// prep timer is started. When the server is unreachable entirely,
    /// the engine falls back to a local prep countdown with the
    /// configured duration so the caller's UI stays usable.
    pub async fn initialize(&self) -> Result<SessionPhase, CoreError> {
        self.inner
            .cache
            .remove_session(&self.inner.session_id, &self.inner.user_id);

        let rules = match self
            .inner
            .client
            .session_rules(self.inner.session_id.as_str())
            .await
        {
            Ok(read) => rules_from_wire(read, &self.inner.timing),
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e,
                    "session rules unavailable, using configured fallbacks");
                SessionRules::fallback(&self.inner.timing)
            }
        };
        self.state().rules = rules;

        match self
            .inner
            .client
            .session_timer(self.inner.session_id.as_str())
            .await
        {
            Ok(Some(timer)) if timer.active => {
                let phase = parse_phase(&timer.phase).unwrap_or(SessionPhase::Prep);
                debug!(session = %self.inner.session_id, %phase, remaining = timer.remaining_seconds,
                    "adopting active server timer");
                self.adopt(phase, Duration::from_secs(timer.remaining_seconds));
            }
            Ok(_) => match self
                .inner
                .client
                .start_timer(
                    self.inner.session_id.as_str(),
                    &SessionPhase::Prep.to_string(),
                    rules.prep.as_secs(),
                )
                .await
            {
                Ok(timer) => {
                    let phase = parse_phase(&timer.phase).unwrap_or(SessionPhase::Prep);
                    self.adopt(phase, Duration::from_secs(timer.remaining_seconds));
                }
                Err(e) => {
                    warn!(session = %self.inner.session_id, error = %e,
                        "could not start server timer, falling back to local prep countdown");
                    self.adopt(SessionPhase::Prep, rules.prep);
                }
            },
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e,
                    "timer read failed, falling back to local prep countdown");
                self.adopt(SessionPhase::Prep, rules.prep);
            }
        }

        self.persist();
        Ok(self.phase())
    }

    /// Install a clock and publish the new state.
    fn adopt(&self, phase: SessionPhase, remaining: Duration) {
        {
            let mut state = self.state();
            state.clock = Some(PhaseClock::start(phase, remaining));
        }
        let _ = self.inner.phase_tx.send(phase);
        let _ = self.inner.remaining_tx.send(self.remaining_seconds());
    }

    fn persist(&self) {
        self.inner.cache.store_session(
            &self.inner.session_id,
            &self.inner.user_id,
            self.phase(),
            self.remaining_seconds(),
        );
    }

    // ── Resync ───────────────────────────────────────────────────────

    /// Re-read the authoritative phase/remaining from the server and
    /// reconcile the local clock against it.
    ///
    /// Server state wins on conflict; regressions are rejected; network
    /// failures are logged and absorbed (the local countdown keeps
    /// running until the next cycle).
    pub async fn resync_once(&self) -> ResyncOutcome {
        let read = match self
            .inner
            .client
            .session_phase(self.inner.session_id.as_str())
            .await
        {
            Ok(read) => read,
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e, "phase resync failed");
                return ResyncOutcome::Skipped;
            }
        };

        let Some(phase) = parse_phase(&read.phase) else {
            return ResyncOutcome::Skipped;
        };

        let remaining = read
            .end_time
            .map(|end| {
                let secs = (end - Utc::now()).num_seconds().max(0);
                Duration::from_secs(secs.unsigned_abs())
            })
            .or_else(|| read.remaining_seconds.map(Duration::from_secs))
            .unwrap_or_else(|| self.state().rules.duration_for(phase));

        let apply = {
            let mut state = self.state();
            match state.clock.as_mut() {
                Some(clock) => {
                    clock.apply_server(phase, remaining, self.inner.timing.drift_tolerance)
                }
                None => {
                    // Resync before initialize: adopt the server state.
                    let from = *self.inner.phase_tx.borrow();
                    state.clock = Some(PhaseClock::start(phase, remaining));
                    ServerApply::Advanced { from, to: phase }
                }
            }
        };

        match apply {
            ServerApply::RegressionRejected { reported } => {
                debug!(session = %self.inner.session_id, %reported,
                    "ignoring stale server read reporting an earlier phase");
            }
            ServerApply::Advanced { from, to } => {
                info!(session = %self.inner.session_id, %from, %to, "server advanced the phase");
                let _ = self.inner.phase_tx.send(to);
                let _ = self.inner.remaining_tx.send(self.remaining_seconds());
                self.persist();
            }
            ServerApply::Corrected { drift } => {
                debug!(session = %self.inner.session_id, drift_ms = drift.as_millis(),
                    "countdown corrected from server");
                let _ = self.inner.remaining_tx.send(self.remaining_seconds());
                self.persist();
            }
            ServerApply::InTolerance => {}
        }

        ResyncOutcome::Applied(apply)
    }

    /// Recompute after a foreground resume.
    ///
    /// The clock is deadline-based, so background time is already
    /// accounted for; what matters is resyncing immediately and firing
    /// any expiry that elapsed while suspended.
    pub async fn on_foreground(&self) -> ResyncOutcome {
        let outcome = self.resync_once().await;
        if self.is_expired() && !self.phase().is_terminal() {
            self.complete_phase().await;
        }
        outcome
    }

    // ── Phase completion ─────────────────────────────────────────────

    /// Advance past the current phase, once.
    ///
    /// Idempotent under racing callers: while a completion is in
    /// flight, further calls return immediately. Used both by the tick
    /// loop on countdown expiry and by user-initiated "done early"
    /// actions.
    pub async fn complete_phase(&self) {
        if self.inner.completing.swap(true, Ordering::SeqCst) {
            return;
        }
        self.advance_phase().await;
        self.inner.completing.store(false, Ordering::SeqCst);
    }

    async fn advance_phase(&self) {
        let current = self.phase();
        if current.is_terminal() {
            return;
        }

        match self
            .inner
            .client
            .complete_phase(self.inner.session_id.as_str())
            .await
        {
            Ok(adv) if adv.completed => {
                info!(session = %self.inner.session_id, "server reports session completed");
                self.adopt(SessionPhase::Completed, Duration::ZERO);
            }
            Ok(adv) => {
                // The response is authoritative, but never lets the
                // phase move backwards.
                let phase = parse_phase(&adv.phase)
                    .filter(|p| *p > current)
                    .or_else(|| current.next())
                    .unwrap_or(SessionPhase::Completed);
                let duration = adv
                    .duration_seconds
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| self.state().rules.duration_for(phase));
                info!(session = %self.inner.session_id, from = %current, to = %phase,
                    "phase completed");
                self.adopt(phase, duration);
            }
            Err(e) => {
                // Conservative local fallback so the user is never
                // stuck on an expired countdown.
                let next = current.next().unwrap_or(SessionPhase::Completed);
                let duration = self.state().rules.duration_for(next);
                warn!(session = %self.inner.session_id, error = %e, from = %current, to = %next,
                    "phase completion failed, applying local fallback transition");
                self.adopt(next, duration);
            }
        }

        self.persist();
    }

    // ── Background loops ─────────────────────────────────────────────

    /// Spawn the 1 s tick loop and the resync loop. Both die with the
    /// returned [`PollingSession`].
    pub fn spawn(&self) -> PollingSession {
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(2);

        {
            let engine = self.clone();
            let token = cancel.clone();
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(1));
                ticker.tick().await;
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => {
                            let _ = engine.inner.remaining_tx.send(engine.remaining_seconds());
                            if engine.is_expired() && !engine.phase().is_terminal() {
                                engine.complete_phase().await;
                            }
                        }
                    }
                }
            }));
        }

        {
            let engine = self.clone();
            let token = cancel.clone();
            let interval = self.inner.timing.resync_interval;
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.tick().await;
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => {
                            engine.resync_once().await;
                        }
                    }
                }
            }));
        }

        PollingSession::new("session-engine", cancel, handles)
    }

    /// Wait until the timed portion of the session is over.
    pub async fn wait_terminal(&self) -> SessionPhase {
        let mut rx = self.inner.phase_tx.subscribe();
        loop {
            let phase = *rx.borrow_and_update();
            if phase.is_terminal() {
                return phase;
            }
            if rx.changed().await.is_err() {
                return phase;
            }
        }
    }
}

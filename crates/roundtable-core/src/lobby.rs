// ── Session lobby watch ──
//
// Pre-session staging: poll who has been admitted and who is ready,
// surface the all-ready signal, and arm the grace countdown once this
// participant marks ready. Poll failures are absorbed; the lobby keeps
// showing the last known roster.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use roundtable_api::GdClient;

use crate::config::Timing;
use crate::error::CoreError;
use crate::model::{Participant, ReadyState, SessionId, UserId};
use crate::poll::PollingSession;
use crate::stream::StateStream;

/// Reactive view of a session's lobby.
#[derive(Clone)]
pub struct LobbyWatch {
    inner: Arc<LobbyInner>,
}

struct LobbyInner {
    client: Arc<GdClient>,
    session_id: SessionId,
    user_id: UserId,
    timing: Timing,
    participants_tx: watch::Sender<Vec<Participant>>,
    ready_tx: watch::Sender<Vec<ReadyState>>,
    all_ready_tx: watch::Sender<bool>,
    /// Deadline of the grace countdown, armed by [`LobbyWatch::mark_ready`].
    countdown_tx: watch::Sender<Option<Instant>>,
}

impl LobbyWatch {
    pub fn new(
        client: Arc<GdClient>,
        session_id: SessionId,
        user_id: UserId,
        timing: Timing,
    ) -> Self {
        let (participants_tx, _) = watch::channel(Vec::new());
        let (ready_tx, _) = watch::channel(Vec::new());
        let (all_ready_tx, _) = watch::channel(false);
        let (countdown_tx, _) = watch::channel(None);

        Self {
            inner: Arc::new(LobbyInner {
                client,
                session_id,
                user_id,
                timing,
                participants_tx,
                ready_tx,
                all_ready_tx,
                countdown_tx,
            }),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    pub fn participants(&self) -> Vec<Participant> {
        self.inner.participants_tx.borrow().clone()
    }

    pub fn ready_states(&self) -> Vec<ReadyState> {
        self.inner.ready_tx.borrow().clone()
    }

    pub fn all_ready(&self) -> bool {
        *self.inner.all_ready_tx.borrow()
    }

    pub fn subscribe_all_ready(&self) -> StateStream<bool> {
        StateStream::new(self.inner.all_ready_tx.subscribe())
    }

    pub fn subscribe_participants(&self) -> StateStream<Vec<Participant>> {
        StateStream::new(self.inner.participants_tx.subscribe())
    }

    /// The armed grace deadline, if this participant has marked ready.
    pub fn countdown_deadline(&self) -> Option<Instant> {
        *self.inner.countdown_tx.borrow()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Publish this participant's readiness and arm the grace countdown.
    pub async fn mark_ready(&self) -> Result<Instant, CoreError> {
        self.inner
            .client
            .update_ready(self.inner.session_id.as_str(), true)
            .await?;

        let deadline = Instant::now() + self.inner.timing.lobby_countdown;
        let _ = self.inner.countdown_tx.send(Some(deadline));
        Ok(deadline)
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// One roster refresh. The acting user is filtered out -- the lobby
    /// shows the *other* participants.
    pub async fn poll_participants_once(&self) {
        match self
            .inner
            .client
            .participants(self.inner.session_id.as_str())
            .await
        {
            Ok(records) => {
                let roster: Vec<Participant> = records
                    .into_iter()
                    .filter(|r| r.id != self.inner.user_id.as_str())
                    .filter_map(|r| Participant::try_from(r).ok())
                    .collect();
                let _ = self.inner.participants_tx.send(roster);
            }
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e, "participant poll failed");
            }
        }
    }

    /// One readiness refresh, including the all-ready check.
    pub async fn poll_ready_once(&self) {
        match self
            .inner
            .client
            .ready_status(self.inner.session_id.as_str())
            .await
        {
            Ok(read) => {
                let states: Vec<ReadyState> = read
                    .ready_statuses
                    .into_iter()
                    .filter_map(|r| ReadyState::try_from(r).ok())
                    .collect();
                let _ = self.inner.ready_tx.send(states);
            }
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e, "ready-status poll failed");
            }
        }

        match self
            .inner
            .client
            .check_all_ready(self.inner.session_id.as_str())
            .await
        {
            Ok(read) if read.all_ready => {
                let _ = self.inner.all_ready_tx.send(true);
            }
            Ok(_) => {}
            Err(e) => {
                warn!(session = %self.inner.session_id, error = %e, "all-ready check failed");
            }
        }
    }

    /// Spawn the participants (5 s) and readiness (3 s) poll loops.
    pub fn spawn(&self) -> PollingSession {
        let cancel = CancellationToken::new();
        let mut handles = Vec::with_capacity(2);

        {
            let lobby = self.clone();
            let token = cancel.clone();
            let interval = self.inner.timing.participants_poll_interval;
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => lobby.poll_participants_once().await,
                    }
                }
            }));
        }

        {
            let lobby = self.clone();
            let token = cancel.clone();
            let interval = self.inner.timing.ready_poll_interval;
            handles.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                loop {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        _ = ticker.tick() => lobby.poll_ready_once().await,
                    }
                }
            }));
        }

        PollingSession::new("lobby-watch", cancel, handles)
    }
}

// ── Scoped ownership of background polling tasks ──
//
// Every screen-lifetime concern (QR usage polling, phase resync, lobby
// readiness) spawns its loops through one of these. Dropping the session
// -- or calling `shutdown()` for a clean join -- cancels the token and
// stops every task, so no callback can touch state after its owner is
// gone. This replaces the ad hoc "is the screen still mounted" flags the
// platform's older clients carried.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owner of a set of cancellable background polling tasks.
pub struct PollingSession {
    name: &'static str,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl PollingSession {
    pub(crate) fn new(
        name: &'static str,
        cancel: CancellationToken,
        handles: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            name,
            cancel,
            handles,
        }
    }

    /// A child token for gating extra work on this session's liveness.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel all tasks and wait for them to wind down.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
        debug!(session = self.name, "polling session shut down");
    }
}

impl Drop for PollingSession {
    fn drop(&mut self) {
        // A dropped session must never leave timers running. The tasks
        // all select on the token, so cancel alone is enough; abort
        // covers a task wedged inside a slow response.
        self.cancel.cancel();
        for handle in &self.handles {
            handle.abort();
        }
    }
}

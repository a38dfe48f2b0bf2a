// ── QR lifecycle client ──
//
// Presents a single "current" admission QR for a venue, keeps its usage
// fresh through the manage listing, and requests a replacement exactly
// once per fullness event. The server owns usage and expiry; this type
// only mirrors them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use roundtable_api::GdClient;

use crate::cache::SnapshotCache;
use crate::config::Timing;
use crate::convert::qr_from_issued;
use crate::error::CoreError;
use crate::model::{QrCode, UserId, VenueId};
use crate::poll::PollingSession;
use crate::stream::StateStream;

/// Result of a user-initiated fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub qr: QrCode,
    /// Server minted a new code for this request -- callers show a
    /// "new QR generated" notice when this is set.
    pub newly_created: bool,
    /// Served from the local snapshot without a network call.
    pub from_cache: bool,
}

/// What a single poll cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Usage refreshed; the code still has capacity.
    Updated { usage: u32, capacity: u32 },
    /// The code filled up and a replacement was obtained.
    Regenerated(QrCode),
    /// The code is full but another regeneration is already in flight.
    RegenerationInFlight,
    /// The code is full and the regeneration attempt failed; the next
    /// cycle will retry.
    RegenerationFailed,
    /// Network failure -- last known state stays authoritative.
    Skipped,
    /// A newer poll already applied; this response was discarded.
    Stale,
    /// Nothing to poll yet (no current QR) or the current code vanished
    /// from the listing.
    NoTarget,
}

/// Client-side lifecycle manager for one venue's admission QR.
///
/// Cheaply cloneable; all clones share state. Only one logical writer
/// exists (the active screen), so coordination is limited to the
/// regeneration guard and the poll sequence counter.
#[derive(Clone)]
pub struct QrLifecycle {
    inner: Arc<QrInner>,
}

struct QrInner {
    client: Arc<GdClient>,
    cache: Arc<SnapshotCache>,
    venue_id: VenueId,
    user_id: UserId,
    timing: Timing,
    current: watch::Sender<Option<QrCode>>,
    /// Guard: at most one regeneration in flight per fullness event.
    regenerating: AtomicBool,
    /// Monotonic sequence for poll cycles, so a response that arrives
    /// after a newer one has applied gets discarded instead of
    /// rolling usage backwards.
    poll_seq: AtomicU64,
    applied_seq: AtomicU64,
}

impl QrLifecycle {
    pub fn new(
        client: Arc<GdClient>,
        cache: Arc<SnapshotCache>,
        venue_id: VenueId,
        user_id: UserId,
        timing: Timing,
    ) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(QrInner {
                client,
                cache,
                venue_id,
                user_id,
                timing,
                current,
                regenerating: AtomicBool::new(false),
                poll_seq: AtomicU64::new(0),
                applied_seq: AtomicU64::new(0),
            }),
        }
    }

    /// The current QR snapshot, if one has been loaded.
    pub fn current(&self) -> Option<QrCode> {
        self.inner.current.borrow().clone()
    }

    /// Subscribe to QR snapshot changes.
    pub fn subscribe(&self) -> StateStream<Option<QrCode>> {
        StateStream::new(self.inner.current.subscribe())
    }

    // ── Fetch-or-create ──────────────────────────────────────────────

    /// Return the venue's current admission QR.
    ///
    /// Without `force_new`, an unexpired cached snapshot is served
    /// without touching the network (even a full one -- it is still the
    /// venue's latest code and worth displaying). Otherwise the server
    /// issues or mints a code, and the result is persisted for offline
    /// display.
    pub async fn fetch_or_create(&self, force_new: bool) -> Result<FetchOutcome, CoreError> {
        if !force_new
            && let Some(snapshot) = self
                .inner
                .cache
                .load_qr(&self.inner.venue_id, &self.inner.user_id)
            && !snapshot.qr.is_expired()
        {
            debug!(venue = %self.inner.venue_id, qr = %snapshot.qr.id, "serving cached QR");
            let _ = self.inner.current.send(Some(snapshot.qr.clone()));
            return Ok(FetchOutcome {
                qr: snapshot.qr,
                newly_created: false,
                from_cache: true,
            });
        }

        let (qr, newly_created) = self.request_qr(force_new, false).await?;
        Ok(FetchOutcome {
            qr,
            newly_created,
            from_cache: false,
        })
    }

    /// Issue request against the server; persists and publishes the result.
    async fn request_qr(
        &self,
        force_new: bool,
        auto_generate: bool,
    ) -> Result<(QrCode, bool), CoreError> {
        let issued = self
            .inner
            .client
            .issue_qr(self.inner.venue_id.as_str(), force_new, auto_generate)
            .await?;

        let newly_created = issued.is_new;
        let qr = qr_from_issued(issued, self.inner.venue_id.clone())?;

        self.inner
            .cache
            .store_qr(&self.inner.venue_id, &self.inner.user_id, &qr);
        let _ = self.inner.current.send(Some(qr.clone()));

        if newly_created {
            info!(venue = %self.inner.venue_id, qr = %qr.id, "new admission QR issued");
        }
        Ok((qr, newly_created))
    }

    // ── Polling ──────────────────────────────────────────────────────

    /// One poll cycle: refresh usage for the current QR from the manage
    /// listing and regenerate if it has filled up.
    ///
    /// Never returns an error -- transient failures are logged and the
    /// last known state stays authoritative for display.
    pub async fn poll_once(&self) -> PollOutcome {
        let Some(current) = self.current() else {
            return PollOutcome::NoTarget;
        };

        let seq = self.inner.poll_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let listing = match self
            .inner
            .client
            .qr_usage(self.inner.venue_id.as_str())
            .await
        {
            Ok(listing) => listing,
            Err(e) => {
                warn!(venue = %self.inner.venue_id, error = %e, "QR status poll failed");
                return PollOutcome::Skipped;
            }
        };

        // Latest poll result wins: discard this response if a newer
        // cycle already applied while we were waiting on the network.
        if self.inner.applied_seq.fetch_max(seq, Ordering::SeqCst) > seq {
            debug!(venue = %self.inner.venue_id, seq, "discarding stale poll response");
            return PollOutcome::Stale;
        }

        let Some(record) = listing.iter().find(|r| r.id == current.id.as_str()) else {
            debug!(venue = %self.inner.venue_id, qr = %current.id, "current QR absent from listing");
            return PollOutcome::NoTarget;
        };

        let mut updated = current;
        updated.apply_usage(record.current_usage, record.is_active);
        let full = updated.is_full() || record.is_full;

        self.inner
            .cache
            .store_qr(&self.inner.venue_id, &self.inner.user_id, &updated);
        let usage = updated.current_usage;
        let capacity = updated.max_capacity;
        let _ = self.inner.current.send(Some(updated));

        if !full {
            return PollOutcome::Updated { usage, capacity };
        }

        // Full: regenerate exactly once. swap() returning true means
        // another cycle holds the guard.
        if self.inner.regenerating.swap(true, Ordering::SeqCst) {
            return PollOutcome::RegenerationInFlight;
        }

        info!(venue = %self.inner.venue_id, "QR is full, requesting replacement");
        let result = self.request_qr(true, true).await;
        self.inner.regenerating.store(false, Ordering::SeqCst);

        match result {
            Ok((qr, _)) => PollOutcome::Regenerated(qr),
            Err(e) => {
                warn!(venue = %self.inner.venue_id, error = %e, "QR regeneration failed");
                PollOutcome::RegenerationFailed
            }
        }
    }

    /// Spawn the status-poll loop (3 s cadence by default). The loop
    /// dies with the returned [`PollingSession`].
    pub fn spawn_polling(&self) -> PollingSession {
        let cancel = CancellationToken::new();
        let lifecycle = self.clone();
        let token = cancel.clone();
        let interval = self.inner.timing.qr_poll_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // consume the immediate first tick
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        lifecycle.poll_once().await;
                    }
                }
            }
        });

        PollingSession::new("qr-polling", cancel, vec![handle])
    }

    /// The poll cadence this lifecycle was configured with.
    pub fn poll_interval(&self) -> Duration {
        self.inner.timing.qr_poll_interval
    }
}

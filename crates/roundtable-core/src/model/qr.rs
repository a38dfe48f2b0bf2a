// ── Admission QR domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{QrId, VenueId};

/// One admission QR code for a venue.
///
/// The server is the sole writer of usage and expiry; a `QrCode` held by
/// the client is always a read-only snapshot. Codes are superseded, not
/// mutated: when one fills up or expires the server mints a replacement
/// and the old code becomes historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub id: QrId,
    /// Opaque payload the venue screen renders as a QR image.
    pub data: String,
    pub venue_id: VenueId,
    /// Links the codes a venue has issued across regenerations.
    pub group_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub max_capacity: u32,
    pub current_usage: u32,
    pub is_active: bool,
}

impl QrCode {
    /// Seats left before the code stops admitting.
    pub fn remaining(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_usage)
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the code can still admit a scan right now.
    pub fn is_admittable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_full() && !self.is_expired_at(now)
    }

    /// Fold a usage-listing record into this snapshot. Usage only moves
    /// through here; the rest of the code is immutable server data.
    pub(crate) fn apply_usage(&mut self, usage: u32, active: bool) {
        self.current_usage = usage;
        self.is_active = active;
    }
}

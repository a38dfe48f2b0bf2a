// Admin endpoints: venue admission QR issuance, usage, and history.

use crate::client::GdClient;
use crate::error::Error;
use crate::types::{QrHistoryRecord, QrIssued, QrUsageRecord};

impl GdClient {
    /// Fetch the venue's current admission QR, or have the server mint a
    /// new one.
    ///
    /// With `force_new` the server supersedes the active code even if it
    /// still has capacity. `auto_generate` marks the request as coming
    /// from the fullness poller rather than an operator action -- the
    /// server logs them differently but the response shape is identical.
    pub async fn issue_qr(
        &self,
        venue_id: &str,
        force_new: bool,
        auto_generate: bool,
    ) -> Result<QrIssued, Error> {
        Self::require_id("venue_id", venue_id)?;

        let mut query = vec![
            ("venue_id", venue_id.to_owned()),
            ("force_new", force_new.to_string()),
        ];
        if auto_generate {
            query.push(("auto_generate", "true".to_owned()));
        }

        self.get("admin/qr", &query).await
    }

    /// Usage listing for every QR the venue has issued (bare array).
    pub async fn qr_usage(&self, venue_id: &str) -> Result<Vec<QrUsageRecord>, Error> {
        Self::require_id("venue_id", venue_id)?;
        self.get("admin/qr/manage", &[("venue_id", venue_id.to_owned())])
            .await
    }

    /// Full QR history for a venue, newest first.
    pub async fn qr_history(&self, venue_id: &str) -> Result<Vec<QrHistoryRecord>, Error> {
        Self::require_id("venue_id", venue_id)?;
        self.get("admin/qr/history", &[("venue_id", venue_id.to_owned())])
            .await
    }
}

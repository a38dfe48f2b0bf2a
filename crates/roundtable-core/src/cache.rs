// ── Local snapshot cache ──
//
// A thin key-value store used only to bridge brief offline or
// backgrounded gaps: the most recent QR per (venue, user) and the most
// recent phase snapshot per (session, user). One JSON file per key.
// Reads tolerate missing or corrupt files (a miss, never an error);
// writes log failures and move on -- losing a cache write must not
// break the flow it rode along with.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{QrCode, SessionId, SessionPhase, UserId, VenueId};

/// Cached QR snapshot for offline display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrSnapshot {
    pub qr: QrCode,
    pub saved_at: DateTime<Utc>,
}

/// Cached phase snapshot for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub remaining_seconds: u64,
    pub saved_at: DateTime<Utc>,
}

/// File-backed snapshot store.
pub struct SnapshotCache {
    dir: PathBuf,
}

impl SnapshotCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform cache directory (`~/.cache/roundtable` on Linux).
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "roundtable", "roundtable")
            .map(|dirs| dirs.cache_dir().to_path_buf())
    }

    // ── QR snapshots ─────────────────────────────────────────────────

    pub fn load_qr(&self, venue_id: &VenueId, user_id: &UserId) -> Option<QrSnapshot> {
        self.read(&qr_key(venue_id, user_id))
    }

    pub fn store_qr(&self, venue_id: &VenueId, user_id: &UserId, qr: &QrCode) {
        self.write(
            &qr_key(venue_id, user_id),
            &QrSnapshot {
                qr: qr.clone(),
                saved_at: Utc::now(),
            },
        );
    }

    pub fn remove_qr(&self, venue_id: &VenueId, user_id: &UserId) {
        self.remove(&qr_key(venue_id, user_id));
    }

    // ── Session snapshots ────────────────────────────────────────────

    pub fn load_session(&self, session_id: &SessionId, user_id: &UserId) -> Option<SessionSnapshot> {
        self.read(&session_key(session_id, user_id))
    }

    pub fn store_session(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        phase: SessionPhase,
        remaining_seconds: u64,
    ) {
        self.write(
            &session_key(session_id, user_id),
            &SessionSnapshot {
                phase,
                remaining_seconds,
                saved_at: Utc::now(),
            },
        );
    }

    pub fn remove_session(&self, session_id: &SessionId, user_id: &UserId) {
        self.remove(&session_key(session_id, user_id));
    }

    // ── Raw file plumbing ────────────────────────────────────────────

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding corrupt cache entry");
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(key, error = %e, "cache dir unavailable, skipping write");
            return;
        }
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = std::fs::write(self.path_for(key), json) {
                    warn!(key, error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(key, error = %e, "cache serialization failed"),
        }
    }

    fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if path.exists() {
            debug!(key, "clearing cache entry");
            let _ = std::fs::remove_file(path);
        }
    }
}

fn qr_key(venue_id: &VenueId, user_id: &UserId) -> String {
    format!("qr_{}_{}", sanitize(venue_id.as_str()), sanitize(user_id.as_str()))
}

fn session_key(session_id: &SessionId, user_id: &UserId) -> String {
    format!(
        "session_{}_{}",
        sanitize(session_id.as_str()),
        sanitize(user_id.as_str())
    )
}

/// Ids come from the server and may hold path-hostile characters.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_qr() -> QrCode {
        QrCode {
            id: crate::model::QrId::new("qr-1").unwrap(),
            data: "GD|venue-1|qr-1".into(),
            venue_id: VenueId::new("venue-1").unwrap(),
            group_id: None,
            created_at: None,
            expires_at: Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap(),
            max_capacity: 15,
            current_usage: 4,
            is_active: true,
        }
    }

    #[test]
    fn qr_snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let venue = VenueId::new("venue-1").unwrap();
        let user = UserId::new("admin-1").unwrap();

        assert!(cache.load_qr(&venue, &user).is_none());

        cache.store_qr(&venue, &user, &sample_qr());
        let snap = cache.load_qr(&venue, &user).unwrap();
        assert_eq!(snap.qr, sample_qr());

        cache.remove_qr(&venue, &user);
        assert!(cache.load_qr(&venue, &user).is_none());
    }

    #[test]
    fn keys_are_scoped_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let venue = VenueId::new("venue-1").unwrap();
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        cache.store_qr(&venue, &alice, &sample_qr());
        assert!(cache.load_qr(&venue, &alice).is_some());
        assert!(cache.load_qr(&venue, &bob).is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_gets_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let session = SessionId::new("sess-1").unwrap();
        let user = UserId::new("stu-1").unwrap();

        std::fs::write(dir.path().join("session_sess-1_stu-1.json"), "{not json").unwrap();

        assert!(cache.load_session(&session, &user).is_none());
        assert!(!dir.path().join("session_sess-1_stu-1.json").exists());
    }

    #[test]
    fn session_snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let session = SessionId::new("sess-1").unwrap();
        let user = UserId::new("stu-1").unwrap();

        cache.store_session(&session, &user, SessionPhase::Discussion, 480);
        let snap = cache.load_session(&session, &user).unwrap();
        assert_eq!(snap.phase, SessionPhase::Discussion);
        assert_eq!(snap.remaining_seconds, 480);
    }

    #[test]
    fn hostile_ids_cannot_escape_the_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path());
        let venue = VenueId::new("../../etc/passwd").unwrap();
        let user = UserId::new("stu/1").unwrap();

        cache.store_qr(&venue, &user, &sample_qr());
        // Everything lands inside the cache dir, no traversal.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}

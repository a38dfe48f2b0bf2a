// Integration tests for the session phase/timer engine using wiremock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roundtable_api::GdClient;
use roundtable_core::{
    ResyncOutcome, ServerApply, SessionEngine, SessionId, SessionPhase, SnapshotCache, Timing,
    UserId,
};

// ── Helpers ─────────────────────────────────────────────────────────

struct Fixture {
    server: MockServer,
    engine: SessionEngine,
    cache: Arc<SnapshotCache>,
    _dir: tempfile::TempDir,
}

async fn setup() -> Fixture {
    let server = MockServer::start().await;
    let client = Arc::new(GdClient::with_client(
        reqwest::Client::new(),
        server.uri().parse().unwrap(),
    ));
    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(SnapshotCache::new(dir.path()));

    let engine = SessionEngine::new(
        Arc::clone(&client),
        Arc::clone(&cache),
        session(),
        user(),
        Timing::default(),
    );

    Fixture {
        server,
        engine,
        cache,
        _dir: dir,
    }
}

fn session() -> SessionId {
    SessionId::new("sess-1").unwrap()
}

fn user() -> UserId {
    UserId::new("stu-1").unwrap()
}

async fn mount_timer(server: &MockServer, active: bool, phase: &str, remaining: u64) {
    Mock::given(method("GET"))
        .and(path("/api/gd/student/session/timer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": active,
            "phase": phase,
            "remaining_seconds": remaining
        })))
        .mount(server)
        .await;
}

async fn mount_phase(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/gd/student/session/phase"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Initialization ──────────────────────────────────────────────────

#[tokio::test]
async fn fresh_session_starts_in_prep_despite_stale_cache() {
    let fixture = setup().await;

    // Stale snapshot from an earlier run of the *same* id must be
    // discarded on initialize.
    fixture
        .cache
        .store_session(&session(), &user(), SessionPhase::Discussion, 42);

    // Server fully unreachable: rules, timer read, and timer start all 404.
    let phase = fixture.engine.initialize().await.unwrap();

    assert_eq!(phase, SessionPhase::Prep);
    // Configured fallback duration, not a literal: Timing::default() prep.
    let remaining = fixture.engine.remaining_seconds();
    assert!((299..=300).contains(&remaining), "remaining={remaining}");

    // The persisted snapshot reflects the fresh prep state.
    let snap = fixture.cache.load_session(&session(), &user()).unwrap();
    assert_eq!(snap.phase, SessionPhase::Prep);
}

#[tokio::test]
async fn initialize_adopts_an_active_server_timer() {
    let fixture = setup().await;
    mount_timer(&fixture.server, true, "discussion", 480).await;

    let phase = fixture.engine.initialize().await.unwrap();

    assert_eq!(phase, SessionPhase::Discussion);
    let remaining = fixture.engine.remaining_seconds();
    assert!((479..=480).contains(&remaining), "remaining={remaining}");
}

#[tokio::test]
async fn initialize_starts_a_prep_timer_when_none_exists() {
    let fixture = setup().await;
    mount_timer(&fixture.server, false, "prep", 0).await;

    // Rules give prep 8 minutes; the started timer must use them.
    Mock::given(method("GET"))
        .and(path("/api/gd/student/session/rules"))
        .and(query_param("session_id", "sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prep_time": 8,
            "discussion_time": 20,
            "survey_time": 5,
            "level": 2
        })))
        .mount(&fixture.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gd/student/session/timer"))
        .and(wiremock::matchers::body_partial_json(json!({
            "session_id": "sess-1",
            "phase": "prep",
            "duration_seconds": 480
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "phase": "prep",
            "remaining_seconds": 480
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    let phase = fixture.engine.initialize().await.unwrap();
    assert_eq!(phase, SessionPhase::Prep);
    assert_eq!(fixture.engine.rules().level, 2);
}

// ── Resync ──────────────────────────────────────────────────────────

#[tokio::test]
async fn resync_overwrites_drifted_countdown() {
    let fixture = setup().await;
    // Local-only initialize: countdown starts at the 300 s fallback.
    fixture.engine.initialize().await.unwrap();

    // Simulates returning to foreground after a long suspension: the
    // server says five seconds are left.
    mount_phase(
        &fixture.server,
        json!({ "phase": "prep", "remaining_seconds": 5 }),
    )
    .await;

    let outcome = fixture.engine.resync_once().await;

    assert!(matches!(
        outcome,
        ResyncOutcome::Applied(ServerApply::Corrected { .. })
    ));
    assert_eq!(fixture.engine.remaining_seconds(), 5);
}

#[tokio::test]
async fn resync_never_regresses_the_phase() {
    let fixture = setup().await;
    mount_timer(&fixture.server, true, "discussion", 600).await;
    fixture.engine.initialize().await.unwrap();
    assert_eq!(fixture.engine.phase(), SessionPhase::Discussion);

    mount_phase(
        &fixture.server,
        json!({ "phase": "prep", "remaining_seconds": 300 }),
    )
    .await;

    let outcome = fixture.engine.resync_once().await;

    assert_eq!(
        outcome,
        ResyncOutcome::Applied(ServerApply::RegressionRejected {
            reported: SessionPhase::Prep
        })
    );
    assert_eq!(fixture.engine.phase(), SessionPhase::Discussion);
}

#[tokio::test]
async fn resync_adopts_server_phase_advance_from_end_time() {
    let fixture = setup().await;
    fixture.engine.initialize().await.unwrap();
    assert_eq!(fixture.engine.phase(), SessionPhase::Prep);

    let end = Utc::now() + ChronoDuration::seconds(10);
    mount_phase(
        &fixture.server,
        json!({ "phase": "discussion", "end_time": end.to_rfc3339() }),
    )
    .await;

    let outcome = fixture.engine.resync_once().await;

    assert!(matches!(
        outcome,
        ResyncOutcome::Applied(ServerApply::Advanced {
            from: SessionPhase::Prep,
            to: SessionPhase::Discussion
        })
    ));
    let remaining = fixture.engine.remaining_seconds();
    assert!((8..=10).contains(&remaining), "remaining={remaining}");
}

#[tokio::test]
async fn resync_network_failure_keeps_local_countdown() {
    let fixture = setup().await;
    fixture.engine.initialize().await.unwrap();
    let before = fixture.engine.remaining_seconds();

    // No phase mock mounted: the resync request 404s.
    let outcome = fixture.engine.resync_once().await;

    assert_eq!(outcome, ResyncOutcome::Skipped);
    let after = fixture.engine.remaining_seconds();
    assert!(after <= before && after >= before.saturating_sub(2));
}

// ── Phase completion ────────────────────────────────────────────────

#[tokio::test]
async fn completion_adopts_the_server_transition() {
    let fixture = setup().await;
    fixture.engine.initialize().await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/gd/student/session/phase/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "phase": "discussion",
            "duration_seconds": 900
        })))
        .expect(1)
        .mount(&fixture.server)
        .await;

    fixture.engine.complete_phase().await;

    assert_eq!(fixture.engine.phase(), SessionPhase::Discussion);
    let remaining = fixture.engine.remaining_seconds();
    assert!((899..=900).contains(&remaining), "remaining={remaining}");
}

#[tokio::test]
async fn completion_failure_applies_the_conservative_fallback() {
    let fixture = setup().await;
    fixture.engine.initialize().await.unwrap();
    assert_eq!(fixture.engine.phase(), SessionPhase::Prep);

    // Completion endpoint down: prep falls forward to discussion with
    // the configured fallback duration.
    let _ = fixture.engine.complete_phase().await;

    assert_eq!(fixture.engine.phase(), SessionPhase::Discussion);
    let remaining = fixture.engine.remaining_seconds();
    assert!((1199..=1200).contains(&remaining), "remaining={remaining}");
}

#[tokio::test]
async fn racing_expiry_fires_completion_once() {
    let fixture = setup().await;
    mount_timer(&fixture.server, true, "prep", 0).await;
    fixture.engine.initialize().await.unwrap();
    assert!(fixture.engine.is_expired());

    Mock::given(method("POST"))
        .and(path("/api/gd/student/session/phase/complete"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "phase": "discussion", "duration_seconds": 900 }))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&fixture.server)
        .await;

    tokio::join!(
        fixture.engine.complete_phase(),
        fixture.engine.complete_phase()
    );

    assert_eq!(fixture.engine.phase(), SessionPhase::Discussion);
}

#[tokio::test]
async fn terminal_transition_ends_the_timed_flow() {
    let fixture = setup().await;
    mount_timer(&fixture.server, true, "discussion", 1).await;
    fixture.engine.initialize().await.unwrap();

    Mock::given(method("POST"))
        .and(path("/api/gd/student/session/phase/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "phase": "survey",
            "duration_seconds": 300
        })))
        .mount(&fixture.server)
        .await;

    fixture.engine.complete_phase().await;

    assert_eq!(fixture.engine.phase(), SessionPhase::Survey);
    assert_eq!(fixture.engine.wait_terminal().await, SessionPhase::Survey);
}

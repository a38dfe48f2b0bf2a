// Integration tests for the survey run using wiremock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roundtable_api::GdClient;
use roundtable_core::{SessionId, SurveyRun, SurveyStep, Timing, UserId};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<GdClient>) {
    let server = MockServer::start().await;
    let client = Arc::new(GdClient::with_client(
        reqwest::Client::new(),
        server.uri().parse().unwrap(),
    ));

    // Question-timer arming is fire-and-forget; accept it everywhere.
    Mock::given(method("POST"))
        .and(path("/api/gd/student/survey/start-question"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .mount(&server)
        .await;

    (server, client)
}

fn session() -> SessionId {
    SessionId::new("sess-1").unwrap()
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

async fn mount_questions(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/gd/student/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Loading & ordering ──────────────────────────────────────────────

#[tokio::test]
async fn load_shuffles_per_user_deterministically() {
    let (server, client) = setup().await;
    mount_questions(
        &server,
        json!([
            { "id": "q1", "text": "Clarity of arguments", "weight": 1.0 },
            { "id": "q2", "text": "Contribution to discussion", "weight": 1.0 },
            { "id": "q3", "text": "Teamwork and collaboration", "weight": 1.0 },
            { "id": "q4", "text": "Listening and building on others", "weight": 0.5 },
        ]),
    )
    .await;

    let timing = Timing::default();
    let run_a = SurveyRun::load(
        Arc::clone(&client),
        session(),
        user("stu-1"),
        1,
        &timing,
    )
    .await;
    let run_b = SurveyRun::load(
        Arc::clone(&client),
        session(),
        user("stu-1"),
        1,
        &timing,
    )
    .await;

    let order_a: Vec<&str> = run_a.questions().iter().map(|q| q.id.as_str()).collect();
    let order_b: Vec<&str> = run_b.questions().iter().map(|q| q.id.as_str()).collect();
    assert_eq!(order_a, order_b);

    // Same multiset of questions, regardless of order.
    let mut sorted = order_a.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec!["q1", "q2", "q3", "q4"]);
}

#[tokio::test]
async fn failed_fetch_falls_back_to_default_questions() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/gd/student/questions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let run = SurveyRun::load(client, session(), user("stu-1"), 1, &Timing::default()).await;

    assert_eq!(run.questions().len(), 3);
    assert!(!run.is_finished());
    assert!(run.current_question().is_some());
}

// ── Ranking & progression ───────────────────────────────────────────

#[tokio::test]
async fn empty_selection_needs_penalty_to_advance() {
    let (server, client) = setup().await;
    mount_questions(&server, json!([{ "id": "q1", "text": "Clarity", "weight": 1.0 }])).await;

    Mock::given(method("POST"))
        .and(path("/api/gd/student/survey/apply-penalty"))
        .and(body_partial_json(json!({
            "session_id": "sess-1",
            "question_id": 1,
            "student_id": "stu-1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut run = SurveyRun::load(client, session(), user("stu-1"), 1, &Timing::default()).await;

    assert_eq!(run.confirm_current().await.unwrap(), SurveyStep::NeedsSelection);

    let step = run.skip_with_penalty().await.unwrap();
    assert_eq!(step, SurveyStep::Completed);
    assert!(run.is_finished());
}

#[tokio::test]
async fn confirm_submits_rankings_and_flags_the_final_question() {
    let (server, client) = setup().await;
    mount_questions(
        &server,
        json!([
            { "id": "q1", "text": "Clarity", "weight": 1.0 },
            { "id": "q2", "text": "Teamwork", "weight": 1.0 },
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/gd/student/survey"))
        .and(body_partial_json(json!({ "session_id": "sess-1", "is_final": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/gd/student/survey"))
        .and(body_partial_json(json!({ "session_id": "sess-1", "is_final": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut run = SurveyRun::load(client, session(), user("stu-1"), 1, &Timing::default()).await;

    assert!(run.select(1, user("stu-2")));
    assert!(run.select(2, user("stu-3")));
    let step = run.confirm_current().await.unwrap();
    assert_eq!(step, SurveyStep::Advanced { index: 1 });

    assert!(run.select(1, user("stu-3")));
    let step = run.confirm_current().await.unwrap();
    assert_eq!(step, SurveyStep::Completed);
}

#[tokio::test]
async fn self_ranking_is_rejected() {
    let (server, client) = setup().await;
    mount_questions(&server, json!([{ "id": "q1", "text": "Clarity", "weight": 1.0 }])).await;

    let mut run = SurveyRun::load(client, session(), user("stu-1"), 1, &Timing::default()).await;

    assert!(!run.select(1, user("stu-1")));
    assert!(run.select(1, user("stu-2")));
    assert_eq!(
        run.current_selection().unwrap().member_at(1),
        Some(&user("stu-2"))
    );
}

#[tokio::test]
async fn question_window_counts_down() {
    let (server, client) = setup().await;
    mount_questions(&server, json!([{ "id": "q1", "text": "Clarity", "weight": 1.0 }])).await;

    let run = SurveyRun::load(client, session(), user("stu-1"), 1, &Timing::default()).await;

    // Freshly opened question: the 30 s window is (almost) untouched.
    let left = run.question_time_left();
    assert!(left <= std::time::Duration::from_secs(30));
    assert!(left >= std::time::Duration::from_secs(28));
}

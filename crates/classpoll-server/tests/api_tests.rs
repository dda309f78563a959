//! Integration tests for the poll API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. A manual clock drives poll expiry.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use classpoll_core::config::PollsConfig;
use classpoll_core::{ManualClock, PollEngine, PollStore};
use classpoll_server::router::build_router;
use classpoll_server::state::AppState;
use classpoll_types::ServerEvent;
use serde_json::{json, Value};
use tower::ServiceExt;

const T0: i64 = 1_700_000_000_000;

fn make_test_state() -> (Arc<AppState>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let engine = PollEngine::new(PollStore::new(), clock.clone(), PollsConfig::default());
    (Arc::new(AppState::new(engine)), clock)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

async fn post(state: &Arc<AppState>, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = build_router(Arc::clone(state))
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

fn france() -> Value {
    json!({
        "question": "Capital of France?",
        "options": [
            { "text": "Paris", "isCorrect": true },
            { "text": "London" }
        ],
        "duration": 30
    })
}

async fn vote(state: &Arc<AppState>, name: &str, option: Value) -> (StatusCode, Value) {
    post(
        state,
        "/api/polls/vote",
        &json!({ "studentName": name, "option": option }),
    )
    .await
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let (state, _clock) = make_test_state();
    let response = build_router(state)
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_active_is_null_before_any_poll() {
    let (state, _clock) = make_test_state();
    let (status, body) = get(&state, "/api/polls/active").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());

    let (status, body) = get(&state, "/api/polls/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_create_poll() {
    let (state, _clock) = make_test_state();
    let (status, body) = post(&state, "/api/polls/create", &france()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(data["question"], "Capital of France?");
    assert_eq!(data["startTime"], T0);
    assert_eq!(data["endTime"], T0 + 30_000);
    assert_eq!(data["totalResponses"], 0);
    assert_eq!(data["options"][0]["id"], "0");
    assert_eq!(data["options"][0]["isCorrect"], true);
    assert_eq!(data["options"][1]["isCorrect"], false);

    let (_, active) = get(&state, "/api/polls/active").await;
    assert_eq!(active["id"], data["id"]);
}

#[tokio::test]
async fn test_create_poll_validation() {
    let (state, _clock) = make_test_state();

    let cases = [
        json!({ "question": "", "options": [{"text": "a"}, {"text": "b"}], "duration": 30 }),
        json!({ "question": "Q", "options": [{"text": "a"}], "duration": 30 }),
        json!({ "question": "Q", "options": [{"text": "a"}, {"text": ""}], "duration": 30 }),
        json!({ "question": "Q", "options": [{"text": "a"}, {"text": "b"}], "duration": 0 }),
        json!({ "question": "Q", "options": [{"text": "a"}, {"text": "b"}], "duration": -10 }),
    ];
    for case in &cases {
        let (status, body) = post(&state, "/api/polls/create", case).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {case}");
        assert_eq!(body["success"], false);
        assert_eq!(body["reason"], "validation_error");
    }

    let (_, active) = get(&state, "/api/polls/active").await;
    assert!(active.is_null());
}

#[tokio::test]
async fn test_long_poll_with_many_options_is_accepted() {
    let (state, _clock) = make_test_state();
    let options: Vec<Value> = (0..12).map(|i| json!({ "text": format!("o{i}") })).collect();
    let (status, body) = post(
        &state,
        "/api/polls/create",
        &json!({ "question": "Q", "options": options, "duration": 7200 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["options"].as_array().unwrap().len(), 12);
    assert_eq!(body["data"]["endTime"], T0 + 7_200_000);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (state, _clock) = make_test_state();
    let (status, body) = post(
        &state,
        "/api/polls/create",
        &json!({ "question": "Q", "duration": "soon" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "bad_request");
}

#[tokio::test]
async fn test_capital_of_france_tally() {
    let (state, _clock) = make_test_state();
    post(&state, "/api/polls/create", &france()).await;

    let (status, _) = vote(&state, "ana", json!("Paris")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = vote(&state, "ben", json!(0)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = vote(&state, "cy", json!("London")).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["totalResponses"], 3);
    assert_eq!(data["options"][0]["count"], 2);
    assert_eq!(data["options"][0]["percentage"], 67);
    assert_eq!(data["options"][1]["count"], 1);
    assert_eq!(data["options"][1]["percentage"], 33);
    assert_eq!(data["responses"]["ana"], 0);
    assert_eq!(data["responses"]["cy"], 1);

    // Repeat voter.
    let (status, body) = vote(&state, "ana", json!("London")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "already_voted");

    let (_, active) = get(&state, "/api/polls/active").await;
    assert_eq!(active["totalResponses"], 3);
    assert_eq!(active["options"][1]["count"], 1);
}

#[tokio::test]
async fn test_vote_rejections_are_distinguishable() {
    let (state, clock) = make_test_state();

    let (status, body) = vote(&state, "ana", json!(0)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "no_active_poll");

    post(&state, "/api/polls/create", &france()).await;

    let (status, body) = vote(&state, "ana", json!("Berlin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_option");

    let (status, body) = vote(&state, "ana", json!(5)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_option");

    let (status, body) = vote(&state, " ", json!(0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "invalid_student_name");

    clock.advance_secs(31);
    let (status, body) = vote(&state, "ana", json!(0)).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["reason"], "poll_expired");
}

#[tokio::test]
async fn test_expired_poll_moves_to_history() {
    let (state, clock) = make_test_state();
    post(&state, "/api/polls/create", &france()).await;
    vote(&state, "ana", json!(0)).await;

    clock.advance_secs(30);

    let (_, active) = get(&state, "/api/polls/active").await;
    assert!(active.is_null());

    let (_, history) = get(&state, "/api/polls/history").await;
    let polls = history["data"].as_array().unwrap();
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0]["totalResponses"], 1);
}

#[tokio::test]
async fn test_second_poll_supersedes_first() {
    let (state, clock) = make_test_state();
    let (_, first) = post(&state, "/api/polls/create", &france()).await;

    clock.advance_secs(10);
    let second_body = json!({
        "question": "Largest planet?",
        "options": [{ "text": "Jupiter" }, { "text": "Mars" }],
        "duration": 60
    });
    let (_, second) = post(&state, "/api/polls/create", &second_body).await;

    let (_, history) = get(&state, "/api/polls/history").await;
    let polls = history["data"].as_array().unwrap();
    assert_eq!(polls.len(), 1);
    assert_eq!(polls[0]["id"], first["data"]["id"]);
    assert_eq!(polls[0]["endTime"], T0 + 10_000);

    let (_, active) = get(&state, "/api/polls/active").await;
    assert_eq!(active["id"], second["data"]["id"]);
    assert_eq!(active["startTime"], T0 + 10_000);
}

#[tokio::test]
async fn test_legacy_option_index_field() {
    let (state, _clock) = make_test_state();
    post(&state, "/api/polls/create", &france()).await;

    let (status, body) = post(
        &state,
        "/api/polls/vote",
        &json!({ "studentName": "ana", "optionIndex": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["options"][1]["count"], 1);
}

#[tokio::test]
async fn test_changes_are_broadcast() {
    let (state, _clock) = make_test_state();
    let mut rx = state.subscribe();

    post(&state, "/api/polls/create", &france()).await;
    vote(&state, "ana", json!("Paris")).await;

    let started = rx.recv().await.unwrap();
    assert!(started.target.is_none());
    assert!(matches!(started.event, ServerEvent::PollStarted(ref v) if v.question == "Capital of France?"));

    let roster = rx.recv().await.unwrap();
    assert!(matches!(roster.event, ServerEvent::StudentList(ref l) if l.is_empty()));

    let updated = rx.recv().await.unwrap();
    match updated.event {
        ServerEvent::PollUpdated(view) => {
            assert_eq!(view.total_responses, 1);
            assert_eq!(view.options[0].percentage, 100);
        }
        other => panic!("expected poll-updated, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_vote_is_not_broadcast() {
    let (state, _clock) = make_test_state();
    post(&state, "/api/polls/create", &france()).await;
    vote(&state, "ana", json!(0)).await;

    let mut rx = state.subscribe();
    vote(&state, "ana", json!(1)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_are_all_recorded() {
    let (state, _clock) = make_test_state();
    post(&state, "/api/polls/create", &france()).await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            let name = format!("student-{}", i % 10);
            vote(&state, &name, json!(i % 2)).await.0
        }));
    }

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 10);
    assert_eq!(conflicts, 10);

    let (_, active) = get(&state, "/api/polls/active").await;
    assert_eq!(active["totalResponses"], 10);
    let counted = active["options"][0]["count"].as_u64().unwrap()
        + active["options"][1]["count"].as_u64().unwrap();
    assert_eq!(counted, 10);
}

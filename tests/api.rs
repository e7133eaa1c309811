use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use match_clock::{
    create_router,
    timer::{FileTimerStore, ManualClock, MatchTimers, MemoryTimerStore, TimerStore},
    AppState,
};

fn app_with(store: Arc<dyn TimerStore>, clock: Arc<ManualClock>) -> Router {
    let timers = MatchTimers::new(store, clock);
    timers.restore().unwrap();
    let state = AppState::new(0, "127.0.0.1".to_string(), Duration::from_millis(100), timers);
    create_router(Arc::new(state))
}

fn memory_app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    (app_with(Arc::new(MemoryTimerStore::new("match")), clock.clone()), clock)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn live_session_over_http() {
    let (app, clock) = memory_app();

    let (status, body) = send(&app, Method::GET, "/matches/42/timer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["elapsed_seconds"], 0);
    assert_eq!(body["status"], "paused");

    clock.set(1_000);
    let (_, body) = send(&app, Method::POST, "/matches/42/timer/toggle", None).await;
    assert_eq!(body["status"], "running");

    clock.set(4_500);
    let (_, body) = send(&app, Method::GET, "/matches/42/timer", None).await;
    assert_eq!(body["timer"]["elapsed_seconds"], 3);

    let (_, body) = send(&app, Method::POST, "/matches/42/timer/toggle", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["timer"]["formatted"], "00:03");

    clock.set(10_000);
    send(&app, Method::POST, "/matches/42/timer/toggle", None).await;
    clock.set(12_000);
    let (_, body) = send(&app, Method::GET, "/matches/42/timer", None).await;
    assert_eq!(body["timer"]["elapsed_seconds"], 5);

    let (_, body) = send(&app, Method::POST, "/matches/42/timer/reset", None).await;
    assert_eq!(body["status"], "reset");
    assert_eq!(body["timer"], json!({
        "match_id": "42",
        "elapsed_seconds": 0,
        "formatted": "00:00",
        "running": false
    }));
}

#[tokio::test]
async fn timer_survives_server_restart() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(1_000));

    let first = app_with(Arc::new(FileTimerStore::open(dir.path(), "match").unwrap()), clock.clone());
    send(&first, Method::POST, "/matches/7/timer/toggle", None).await;
    drop(first);

    clock.set(126_000);
    let second = app_with(Arc::new(FileTimerStore::open(dir.path(), "match").unwrap()), clock.clone());

    let (_, body) = send(&second, Method::GET, "/matches/7/timer", None).await;
    assert_eq!(body["timer"]["elapsed_seconds"], 125);
    assert_eq!(body["timer"]["formatted"], "02:05");

    let (_, status) = send(&second, Method::GET, "/status", None).await;
    assert_eq!(status["running_matches"], json!(["7"]));
}

#[tokio::test]
async fn events_are_stamped_with_the_clock() {
    let (app, clock) = memory_app();
    send(&app, Method::POST, "/matches/42/timer/toggle", None).await;
    clock.set(95_000);

    let (status, body) = send(
        &app,
        Method::POST,
        "/matches/42/events",
        Some(json!({"action": 3, "type": "corner_away"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"], json!({"match": 42, "action": 3, "delay": 95, "type": "corner_away"}));
    assert_eq!(body["formatted_delay"], "01:35");
    assert_eq!(body["label"], "Corner (away)");

    let (_, body) = send(
        &app,
        Method::POST,
        "/matches/42/events",
        Some(json!({"action": 3, "video_timestamp": 30.5})),
    )
    .await;
    assert_eq!(body["event"]["delay"], 23);
}

#[tokio::test]
async fn bad_match_ids_are_client_errors() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, Method::POST, "/matches/final/events", Some(json!({"action": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(&app, Method::POST, "/matches/a.b/timer/toggle", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a leading sign parses as a number but is not a backend id
    let (status, body) = send(&app, Method::POST, "/matches/+42/events", Some(json!({"action": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, _) = send(
        &app,
        Method::POST,
        "/matches/+42/events/adjust",
        Some(json!({"adjustment": 5, "events": [{"id": 1, "delay": 10}]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn single_event_delay_adjustment_floors_at_zero() {
    let (app, _) = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/matches/42/events/adjust",
        Some(json!({
            "adjustment": -30,
            "event_id": 2,
            "events": [{"id": 1, "delay": 100}, {"id": 2, "delay": 12}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"mode": "single", "patch": {"id": 2, "delay": 0}}));
}

#[tokio::test]
async fn bulk_delay_adjustment_uses_first_event() {
    let (app, _) = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/matches/42/events/adjust",
        Some(json!({
            "adjustment": 15,
            "events": [{"id": 4, "delay": 60}, {"id": 5, "delay": 200}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"mode": "bulk", "patch": {"ids": [4, 5], "update": {"delay": 75}}}));
}

#[tokio::test]
async fn delay_adjustment_errors() {
    let (app, _) = memory_app();

    let (status, _) = send(
        &app,
        Method::POST,
        "/matches/42/events/adjust",
        Some(json!({"adjustment": 5, "event_id": 9, "events": [{"id": 1, "delay": 10}]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/matches/42/events/adjust",
        Some(json!({"adjustment": 5, "events": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn markers_are_laid_out_on_the_timeline() {
    let (app, _) = memory_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/video/markers",
        Some(json!({"duration": 200.0, "markers": [{"timestamp": 50.0}, {"timestamp": 3725.0}]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["markers"][0]["position_percent"], 25.0);
    assert_eq!(body["markers"][0]["label"], "00:00:50");
    assert_eq!(body["markers"][1]["position_percent"], 100.0);
    assert_eq!(body["markers"][1]["label"], "01:02:05");
}

#[tokio::test]
async fn health_and_status() {
    let (app, _) = memory_app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (_, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(body["refresh_interval_ms"], 100);
    assert_eq!(body["running_matches"], json!([]));
}

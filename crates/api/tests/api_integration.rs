//! API integration tests.
//!
//! These drive the router against an in-memory store seeded with one
//! departing flight.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    response::Response,
};
use baggage_api::{AppState, router as api_router};
use baggage_common::ReconciliationConfig;
use baggage_core::InMemoryStore;
use baggage_db::entities::{
    bag_piece::{self, BagStatus},
    bag_set::{self, BagSetStatus},
    flight,
    passenger::{self, PassengerStatus},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

fn create_test_flight(id: &str, origin: &str, departs_in_minutes: i64) -> flight::Model {
    let now = Utc::now();
    flight::Model {
        id: id.to_string(),
        code: "BA117".to_string(),
        origin: origin.to_string(),
        destination: "JFK".to_string(),
        scheduled_at: (now + Duration::minutes(departs_in_minutes)).into(),
        gate_closes_at: None,
        created_at: (now - Duration::days(1)).into(),
    }
}

fn create_test_piece(set_id: &str, index: i32, status: BagStatus) -> bag_piece::Model {
    bag_piece::Model {
        id: format!("{set_id}-p{index}"),
        bag_set_id: set_id.to_string(),
        tag_full: format!("0125{set_id}{index:02}"),
        piece_index: index,
        status,
        last_scan_at: None,
        station: Some("LHR".to_string()),
        boarding_pass_id: None,
        created_at: Utc::now().into(),
    }
}

/// One LHR flight departing in 50 minutes. Passenger `pax1` checked two
/// bags: piece 1 is loaded, piece 2 is still at the counter.
async fn create_test_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_flight(create_test_flight("f1", "LHR", 50)).await;
    store
        .insert_passenger(passenger::Model {
            id: "pax1".to_string(),
            flight_id: "f1".to_string(),
            name: "Ada Lovelace".to_string(),
            pnr: Some("ABC123".to_string()),
            pieces_declared: 2,
            status: PassengerStatus::CheckedIn,
            created_at: Utc::now().into(),
        })
        .await;
    store
        .insert_bag_set(bag_set::Model {
            id: "s1".to_string(),
            passenger_id: "pax1".to_string(),
            flight_id: "f1".to_string(),
            base_tag: "0125s1".to_string(),
            pieces_expected: 2,
            status: BagSetStatus::InProgress,
            created_at: Utc::now().into(),
            updated_at: None,
        })
        .await;
    store
        .insert_bag_piece(create_test_piece("s1", 1, BagStatus::Loaded))
        .await;
    store
        .insert_bag_piece(create_test_piece("s1", 2, BagStatus::Created))
        .await;
    store
}

fn create_test_router(store: Arc<InMemoryStore>) -> Router {
    api_router().with_state(AppState::new(store, &ReconciliationConfig::default()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_run_pass_returns_sorted_notifications() {
    let store = create_test_store().await;
    let app = create_test_router(store.clone());

    let response = app
        .oneshot(post("/reconciliation/pass", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let types: Vec<&str> = body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["flight-departing-soon", "incomplete-bag-set"]);
    assert_eq!(body["data"]["notifications"][0]["priority"], "high");
    assert_eq!(body["data"]["created"], 2);
    assert!(body["data"].get("error").is_none());
    assert_eq!(store.notification_writes(), 2);
}

#[tokio::test]
async fn test_run_pass_without_body() {
    let store = create_test_store().await;
    let request = Request::builder()
        .uri("/reconciliation/pass")
        .method("POST")
        .body(Body::empty())
        .unwrap();

    let response = create_test_router(store.clone())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["created"], 2);
    assert_eq!(store.notification_writes(), 2);
}

#[tokio::test]
async fn test_second_pass_creates_nothing() {
    let store = create_test_store().await;

    create_test_router(store.clone())
        .oneshot(post("/reconciliation/pass", json!({})))
        .await
        .unwrap();
    let response = create_test_router(store.clone())
        .oneshot(post("/reconciliation/pass", json!({ "station": "LHR" })))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["created"], 0);
    assert_eq!(body["data"]["notifications"].as_array().unwrap().len(), 2);
    assert_eq!(store.notification_writes(), 2);
}

#[tokio::test]
async fn test_pass_reports_skipped_flight() {
    let store = create_test_store().await;
    store.fail_reads_for_flight("f1").await;

    let response = create_test_router(store)
        .oneshot(post("/reconciliation/pass", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["skippedFlights"][0]["flightId"], "f1");
    assert_eq!(body["data"]["error"]["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn test_unread_counts_and_mark_all_read() {
    let store = create_test_store().await;
    create_test_router(store.clone())
        .oneshot(post("/reconciliation/pass", json!({})))
        .await
        .unwrap();

    let counts = json_body(
        create_test_router(store.clone())
            .oneshot(get("/notifications/unread-counts?station=LHR"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(counts["data"]["total"], 2);
    assert_eq!(counts["data"]["high"], 1);
    assert_eq!(counts["data"]["medium"], 1);

    let marked = json_body(
        create_test_router(store.clone())
            .oneshot(post("/notifications/read-all", json!({ "station": "LHR" })))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(marked["data"]["count"], 2);

    let unread = json_body(
        create_test_router(store)
            .oneshot(get("/notifications?unreadOnly=true"))
            .await
            .unwrap(),
    )
    .await;
    assert!(unread["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_unknown_notification_returns_404() {
    let app = create_test_router(create_test_store().await);

    let response = app
        .oneshot(post(
            "/notifications/read",
            json!({ "notificationId": "nope" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_flight_statistics() {
    let app = create_test_router(create_test_store().await);

    let response = app.oneshot(get("/flights/f1/statistics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["bagsExpected"], 2);
    assert_eq!(body["data"]["bagsScanned"], 1);
    assert_eq!(body["data"]["bagsLoaded"], 1);
    assert_eq!(body["data"]["incompleteSets"], 1);
    assert_eq!(body["data"]["completionRate"], 50);
}

#[tokio::test]
async fn test_station_statistics_for_quiet_station() {
    let app = create_test_router(create_test_store().await);

    let response = app
        .oneshot(get("/statistics/stations?station=AMS"))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"][0]["station"], "AMS");
    assert_eq!(body["data"][0]["flightCount"], 0);
}

#[tokio::test]
async fn test_incomplete_bag_sets() {
    let app = create_test_router(create_test_store().await);

    let response = app
        .oneshot(get("/bag-sets/incomplete?flightId=f1"))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"][0]["id"], "s1");
    assert_eq!(body["data"][0]["status"], "in_progress");
}

#[tokio::test]
async fn test_scan_completes_set_and_appears_in_history() {
    let store = create_test_store().await;

    let response = create_test_router(store.clone())
        .oneshot(post(
            "/scans",
            json!({
                "tagFull": "0125s102",
                "action": "check_in",
                "agent": "agent-7",
                "station": "LHR",
                "boardingPassId": "bp-1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["piece"]["status"], "checked_in");
    assert_eq!(body["data"]["bagSetStatus"], "complete");

    let incomplete = json_body(
        create_test_router(store.clone())
            .oneshot(get("/bag-sets/incomplete"))
            .await
            .unwrap(),
    )
    .await;
    assert!(incomplete["data"].as_array().unwrap().is_empty());

    let history = json_body(
        create_test_router(store)
            .oneshot(get("/bag-pieces/0125s102/history"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(history["data"][0]["action"], "check_in");
    assert_eq!(history["data"][0]["previousStatus"], "created");
}

#[tokio::test]
async fn test_backward_scan_returns_conflict() {
    let app = create_test_router(create_test_store().await);

    let response = app
        .oneshot(post(
            "/scans",
            json!({
                "tagFull": "0125s101",
                "action": "check_in",
                "agent": "agent-7",
                "station": "LHR"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_scan_request_returns_400() {
    let app = create_test_router(create_test_store().await);

    let response = app
        .oneshot(post(
            "/scans",
            json!({
                "tagFull": "0125s101",
                "action": "load",
                "agent": "",
                "station": "LONDON"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_bag_and_correction() {
    let store = create_test_store().await;
    create_test_router(store.clone())
        .oneshot(post(
            "/scans",
            json!({
                "tagFull": "0125s102",
                "action": "report_missing",
                "agent": "agent-7",
                "station": "LHR"
            }),
        ))
        .await
        .unwrap();

    let missing = json_body(
        create_test_router(store.clone())
            .oneshot(get("/bag-pieces/missing?station=LHR"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(missing["data"][0]["tagFull"], "0125s102");

    let corrected = create_test_router(store.clone())
        .oneshot(post(
            "/bag-pieces/0125s102/correction",
            json!({ "status": "loaded", "agent": "supervisor-1", "station": "LHR" }),
        ))
        .await
        .unwrap();
    assert_eq!(corrected.status(), StatusCode::OK);
    let body = json_body(corrected).await;
    assert_eq!(body["data"]["log"]["action"], "correction");
    assert_eq!(body["data"]["bagSetStatus"], "complete");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(create_test_store().await);

    let response = app.oneshot(get("/nonexistent")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

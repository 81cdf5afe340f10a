//! HTTP integration tests for the progress API.
//!
//! Exercises the assembled router (middleware included) with `oneshot`
//! requests and verifies:
//! 1. Status codes for success and each error class
//! 2. Response bodies use camelCase and stable error codes
//! 3. Admin endpoints (reset, rebuild, reconcile) round-trip through the store

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use medsim_progress::adapters::catalog::InMemoryCaseCatalog;
use medsim_progress::adapters::http::{app_router, ProgressAppState};
use medsim_progress::adapters::storage::InMemoryProgressStore;
use medsim_progress::application::{ProgressAggregator, ProgressReconciler};
use medsim_progress::config::ProgressConfig;
use medsim_progress::domain::foundation::CaseId;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn test_app() -> (Router, Arc<InMemoryProgressStore>) {
    let store = Arc::new(InMemoryProgressStore::new());
    let catalog = InMemoryCaseCatalog::new()
        .with_case(CaseId::new("chest-pain").unwrap(), "Beginner")
        .with_case(CaseId::new("sepsis").unwrap(), "Medium")
        .with_case(CaseId::new("tamponade").unwrap(), "Hard");
    let aggregator = Arc::new(ProgressAggregator::new(
        Arc::new(catalog),
        store.clone(),
        ProgressConfig::default(),
    ));
    let reconciler = Arc::new(ProgressReconciler::new(aggregator.clone(), store.clone(), 2));
    let state = ProgressAppState {
        aggregator,
        reconciler,
    };
    (app_router(state, Duration::from_secs(5)), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Completions
// =============================================================================

#[tokio::test]
async fn record_completion_returns_updated_progress() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/progress/student-1/completions",
            json!({ "caseId": "chest-pain", "score": 90 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "student-1");
    assert_eq!(body["totalCasesCompleted"], 1);
    assert_eq!(body["overallAverageScore"], 90.0);
    assert_eq!(body["tiers"]["beginner"]["casesCompleted"], 1);
    assert_eq!(body["currentProgressionLevel"], "beginner");
    assert_eq!(body["nextMilestone"]["targetLevel"], "intermediate");
}

#[tokio::test]
async fn null_score_is_bad_request() {
    let (app, store) = test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/progress/student-1/completions",
            json!({ "caseId": "chest-pain", "score": null }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert!(body["message"].as_str().unwrap().contains("invalid score"));
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn out_of_range_score_is_bad_request() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        post_json(
            "/api/progress/student-1/completions",
            json!({ "caseId": "chest-pain", "score": 100.5 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_case_is_not_found() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        post_json(
            "/api/progress/student-1/completions",
            json!({ "caseId": "missing-case", "score": 80 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CASE_NOT_FOUND");
}

#[tokio::test]
async fn repeated_completion_id_is_counted_once() {
    let (app, _) = test_app();
    let payload = json!({
        "caseId": "tamponade",
        "score": 82.5,
        "completionId": "8d7c5f1e-2b1a-4c3d-9e8f-0a1b2c3d4e5f"
    });

    let (first, _) = send(
        &app,
        post_json("/api/progress/student-2/completions", payload.clone()),
    )
    .await;
    let (second, body) = send(
        &app,
        post_json("/api/progress/student-2/completions", payload),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(body["tiers"]["advanced"]["casesCompleted"], 1);
}

// =============================================================================
// Summary
// =============================================================================

#[tokio::test]
async fn summary_for_new_user_is_zeroed() {
    let (app, store) = test_app();

    let (status, body) = send(&app, get("/api/progress/newcomer")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCasesCompleted"], 0);
    assert_eq!(body["overallAverageScore"], 0.0);
    assert_eq!(body["currentProgressionLevel"], "beginner");
    assert_eq!(store.record_count().await, 0);
}

#[tokio::test]
async fn summary_reflects_recorded_completions() {
    let (app, _) = test_app();
    for (case, score) in [("chest-pain", 70), ("sepsis", 80), ("tamponade", 90)] {
        send(
            &app,
            post_json(
                "/api/progress/student-3/completions",
                json!({ "caseId": case, "score": score }),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, get("/api/progress/student-3")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCasesCompleted"], 3);
    assert_eq!(body["overallAverageScore"], 80.0);
    assert_eq!(body["tiers"]["intermediate"]["averageScore"], 80.0);
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn reset_zeroes_progress() {
    let (app, _) = test_app();
    send(
        &app,
        post_json(
            "/api/progress/student-4/completions",
            json!({ "caseId": "sepsis", "score": 95 }),
        ),
    )
    .await;

    let (status, body) = send(&app, post("/api/progress/student-4/reset")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCasesCompleted"], 0);
    assert_eq!(body["tiers"]["intermediate"]["casesCompleted"], 0);
}

#[tokio::test]
async fn rebuild_reports_no_drift_for_consistent_record() {
    let (app, _) = test_app();
    send(
        &app,
        post_json(
            "/api/progress/student-5/completions",
            json!({ "caseId": "chest-pain", "score": 60 }),
        ),
    )
    .await;

    let (status, body) = send(&app, post("/api/progress/student-5/rebuild")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["driftDetected"], false);
    assert_eq!(body["progress"]["totalCasesCompleted"], 1);
}

#[tokio::test]
async fn reconcile_reports_every_user() {
    let (app, _) = test_app();
    for user in ["a", "b"] {
        send(
            &app,
            post_json(
                &format!("/api/progress/{}/completions", user),
                json!({ "caseId": "chest-pain", "score": 75 }),
            ),
        )
        .await;
    }

    let (status, body) = send(&app, post("/api/progress/reconcile")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usersChecked"], 2);
    assert_eq!(body["usersRepaired"], 0);
    assert_eq!(body["failures"], json!([]));
}

#[tokio::test]
async fn storage_outage_hides_details() {
    let (app, store) = test_app();
    store.set_unavailable(true);

    let (status, body) = send(&app, get("/api/progress/student-6")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "STORAGE_FAILURE");
    assert_eq!(body["message"], "Internal storage error");
}

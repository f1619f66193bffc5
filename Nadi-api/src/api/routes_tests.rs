use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::api::handlers::tests::test_state;
use crate::api::routes::create_app;

async fn send(method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let app = create_app(test_state());
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health_route() {
    let (status, _) = send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);

    let doc: Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/api/v1/analysis/batch"].is_object());
}

#[tokio::test]
async fn test_batch_route_accepts_loose_cells() {
    let payload = json!({
        "source": "upload.csv",
        "rows": [
            { "subject_id": "A", "systolic": "120", "diastolic": 80, "ward": "3B" },
            { "subject_id": "A", "systolic": 145, "diastolic": "95" },
            { "subject_id": "", "systolic": 200, "diastolic": 120 }
        ]
    });
    let (status, body) = send(Method::POST, "/api/v1/analysis/batch", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["report"]["dropped_rows"], 1);
    assert_eq!(body["report"]["rows"][0]["ward"], "3B");
    assert_eq!(body["report"]["rows"][1]["predicted_systolic"], 170.0);
    assert_eq!(body["report"]["rows"][1]["is_hypertensive"], true);
}

#[tokio::test]
async fn test_batch_route_accepts_numeric_subject_ids() {
    let payload = json!({
        "rows": [
            { "subject_id": 101, "systolic": 120, "diastolic": 80 },
            { "subject_id": "101", "systolic": 145, "diastolic": 95 },
            { "subject_id": true, "systolic": 200, "diastolic": 120 }
        ]
    });
    let (status, body) = send(Method::POST, "/api/v1/analysis/batch", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["report"]["dropped_rows"], 1);
    assert_eq!(body["report"]["subjects"][0]["subject_id"], "101");
    assert_eq!(body["report"]["subjects"][0]["reading_count"], 2);
    assert_eq!(body["report"]["rows"][1]["predicted_systolic"], 170.0);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (status, _) = send(Method::POST, "/api/v1/analysis/personal", Some(json!({ "name": "Budi" }))).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _) = send(Method::GET, "/api/v1/readings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

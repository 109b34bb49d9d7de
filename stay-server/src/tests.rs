//! Router tests against a small tree-ensemble bundle

use std::fs;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use stay_core::constants::BUNDLE_MANIFEST;
use stay_core::Predictor;

use super::*;
use crate::middleware::request_id::REQUEST_ID_HEADER;

/// Long stay exactly when the merged surgery department is set
const TREES: &str = r#"{
    "n_features": 5, "n_classes": 2, "learning_rate": 1.0, "init": [0.0],
    "stages": [[{"nodes": [
        {"feature": 2, "threshold": 0.5, "left": 1, "right": 2},
        {"value": -2.0}, {"value": 2.0}
    ]}]]
}"#;

fn test_app() -> Router {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("trees.json"), TREES).unwrap();
    let manifest = json!({
        "name": "router_test",
        "train_columns": [
            "Hospital",
            "Bed_Grade",
            "Department_TB & Chest disease + surgery",
            "Department_gynecology",
            "Age_41-50"
        ],
        "model": { "kind": "tree_ensemble", "path": "trees.json" }
    });
    fs::write(dir.path().join(BUNDLE_MANIFEST), manifest.to_string()).unwrap();

    let config = config::Config::default();
    let predictor = Predictor::load(dir.path(), config.pipeline()).unwrap();

    create_router(AppState {
        predictor: Arc::new(predictor),
        config,
    })
}

fn admission(department: &str) -> Value {
    json!({
        "hospital": 8,
        "hospital_type": 2,
        "hospital_city": 3,
        "hospital_region": 2,
        "extra_rooms": "3",
        "department": department,
        "ward_type": "R",
        "ward_facility": "F",
        "bed_grade": 2.0,
        "admission_type": "Emergency",
        "illness_severity": "Extreme",
        "visitors": "2",
        "age": 45
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

const FORM: &str = "hospital=8&hospital_type=2&hospital_city=3&hospital_region=2\
    &extra_rooms=3&department=surgery&ward_type=R&ward_facility=F&bed_grade=2.0\
    &admission_type=Emergency&illness_severity=Extreme&visitors=2&age=45";

#[tokio::test]
async fn test_health() {
    let response = test_app().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "router_test");
    assert_eq!(body["backend"], "tree_ensemble");
}

#[tokio::test]
async fn test_form_page() {
    let response = test_app().oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(html.contains("name=\"illness_severity\""));
}

#[tokio::test]
async fn test_form_submission_shows_label() {
    let response = test_app().oneshot(post_form(FORM)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Prediction: <b>31 days or more</b>"));
}

#[tokio::test]
async fn test_form_missing_field_shows_failure() {
    let body = FORM.replacen("hospital=8&", "", 1);
    let response = test_app().oneshot(post_form(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Prediction failed."));
    assert!(html.contains("&#39;Hospital&#39;"));
    assert!(!html.contains("Prediction: <b>"));
}

#[tokio::test]
async fn test_json_predict() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/predict", &admission("surgery")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "31 days or more");
    assert_eq!(body["class_index"], 1);
    assert_eq!(body["method"], "tree_ensemble");
    assert!(body["request_id"].is_string());

    let response = app
        .oneshot(post_json("/api/v1/predict", &admission("gynecology")))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["label"], "30 days or less");
    assert_eq!(body["class_index"], 0);
}

#[tokio::test]
async fn test_json_validation_error() {
    let mut record = admission("cardiology");
    record["hospital"] = json!(99);

    let response = test_app()
        .oneshot(post_json("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("department"));
    assert!(detail.contains("hospital"));
}

#[tokio::test]
async fn test_json_missing_passthrough_field() {
    let mut record = admission("surgery");
    record.as_object_mut().unwrap().remove("bed_grade");

    let response = test_app()
        .oneshot(post_json("/api/v1/predict", &record))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Prediction failed."));
    assert!(body["detail"].as_str().unwrap().contains("Bed_Grade"));
}

#[tokio::test]
async fn test_model_info_tracks_predictions() {
    let app = test_app();
    app.clone()
        .oneshot(post_json("/api/v1/predict", &admission("surgery")))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/v1/model")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["layout"]["column_count"], 5);
    assert_eq!(body["status"]["prediction_count"], 1);
    assert!(body["label_classes"].is_null());
}

#[tokio::test]
async fn test_options() {
    let response = test_app().oneshot(get("/api/v1/options")).await.unwrap();
    let body = body_json(response).await;

    assert_eq!(body["age_is_banded"], false);
    assert!(body["department"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d == "TB & Chest disease"));
}

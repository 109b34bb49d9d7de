//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: String,
    backend: String,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let metadata = state.predictor.metadata();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: metadata.name.clone(),
        backend: metadata.backend.clone(),
    })
}

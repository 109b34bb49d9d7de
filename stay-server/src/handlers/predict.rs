//! JSON prediction handler

use axum::{extract::State, Json};

use crate::middleware::request_id::RequestId;
use crate::models::{AdmissionForm, PredictionResponse};
use crate::{AppResult, AppState};

use super::run_prediction;

/// Predict the stay category for one admission
pub async fn predict(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    Json(form): Json<AdmissionForm>,
) -> AppResult<Json<PredictionResponse>> {
    form.check(state.config.bucketing)?;

    let prediction = run_prediction(state.predictor.clone(), form.to_record()).await?;
    Ok(Json(PredictionResponse::new(request_id, prediction)))
}

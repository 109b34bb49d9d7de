//! Browser form handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use stay_core::FormOptions;

use crate::error::PREDICTION_FAILED;
use crate::models::AdmissionForm;
use crate::views;
use crate::{AppError, AppState};

use super::run_prediction;

/// Render the admission form
pub async fn show(State(state): State<AppState>) -> Html<String> {
    let banded = FormOptions::age_is_banded(state.config.bucketing);
    Html(views::render_form(&FormOptions::current(), banded))
}

/// Handle a form submission; answers with a result page either way
pub async fn submit(State(state): State<AppState>, Form(form): Form<AdmissionForm>) -> Response {
    if let Err(errors) = form.check(state.config.bucketing) {
        let page = views::render_failure("Invalid admission form.", &errors.to_string());
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    match run_prediction(state.predictor.clone(), form.to_record()).await {
        Ok(prediction) => {
            Html(views::render_prediction(&prediction.label, &prediction.dropped)).into_response()
        }
        Err(err) => {
            let detail = match &err {
                AppError::PredictionFailed(e) => e.to_string(),
                other => other.to_string(),
            };
            tracing::warn!("Form prediction failed: {}", detail);
            let page = views::render_failure(PREDICTION_FAILED, &detail);
            (err.status(), Html(page)).into_response()
        }
    }
}

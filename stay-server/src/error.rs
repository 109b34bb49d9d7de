//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stay_core::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("invalid admission form: {0}")]
    ValidationError(String),

    // Pipeline errors
    #[error("prediction failed: {0}")]
    PredictionFailed(#[from] PredictError),

    // Generic errors
    #[error("internal error: {0}")]
    InternalError(String),
}

/// Message shown for every failed prediction, ahead of the diagnostic
pub const PREDICTION_FAILED: &str =
    "Prediction failed. This usually means the form inputs don't match the model's training columns.";

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PredictionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, detail) = match &self {
            AppError::ValidationError(msg) => ("Invalid admission form", Some(msg.clone())),
            AppError::PredictionFailed(e) => {
                tracing::warn!("Prediction failed: {}", e);
                (PREDICTION_FAILED, Some(e.to_string()))
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error", None)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "detail": detail,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

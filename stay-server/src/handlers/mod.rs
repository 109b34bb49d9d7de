//! HTTP handlers

pub mod form;
pub mod health;
pub mod model;
pub mod predict;

use std::sync::Arc;

use stay_core::{Prediction, Predictor, RawRecord};

use crate::AppResult;

/// Run the pipeline off the async executor; ONNX inference blocks
pub(crate) async fn run_prediction(
    predictor: Arc<Predictor>,
    record: RawRecord,
) -> AppResult<Prediction> {
    let prediction = tokio::task::spawn_blocking(move || predictor.predict(&record)).await??;
    Ok(prediction)
}

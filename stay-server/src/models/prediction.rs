//! Prediction response model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use stay_core::{DroppedIndicator, Prediction};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub label: String,
    pub class_index: i64,
    pub probabilities: Option<Vec<f32>>,
    pub dropped: Vec<DroppedIndicator>,
    pub method: String,
    pub inference_time_us: u64,
}

impl PredictionResponse {
    pub fn new(request_id: Uuid, prediction: Prediction) -> Self {
        Self {
            request_id,
            label: prediction.label,
            class_index: prediction.class_index,
            probabilities: prediction.probabilities,
            dropped: prediction.dropped,
            method: prediction.method,
            inference_time_us: prediction.inference_time_us,
        }
    }
}

//! Model information handlers

use axum::{extract::State, Json};
use serde::Serialize;

use stay_core::logic::model::BundleMetadata;
use stay_core::logic::pipeline::EngineStatus;
use stay_core::{FormOptions, LayoutInfo};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub metadata: BundleMetadata,
    pub layout: LayoutInfo,
    /// `None` when labels come from the fallback table
    pub label_classes: Option<Vec<String>>,
    pub status: EngineStatus,
}

/// Loaded bundle, column layout and running counters
pub async fn info(State(state): State<AppState>) -> Json<ModelInfo> {
    let predictor = &state.predictor;
    Json(ModelInfo {
        metadata: predictor.metadata().clone(),
        layout: predictor.layout_info(),
        label_classes: predictor.decoder().classes().map(<[String]>::to_vec),
        status: predictor.status(),
    })
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    #[serde(flatten)]
    pub options: FormOptions,
    pub age_is_banded: bool,
}

/// Choices offered by the admission form
pub async fn options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        options: FormOptions::current(),
        age_is_banded: FormOptions::age_is_banded(state.config.bucketing),
    })
}

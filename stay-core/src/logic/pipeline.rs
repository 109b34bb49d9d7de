//! Prediction Pipeline
//!
//! `RawRecord → bucket → align → classify → decode`, once per submission.
//! The [`Predictor`] is built at startup from a loaded bundle and the
//! pipeline configuration, then only read.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::logic::config::{AgeBanding, BucketingProfile, PipelineConfig};
use crate::logic::features::{
    align, AlignError, Alignment, BucketedRecord, Bucketer, DroppedIndicator, LayoutInfo,
    RawRecord, TrainingSchema,
};
use crate::logic::model::{
    BundleError, BundleMetadata, InferenceError, LabelDecoder, ModelBundle, UnknownClass,
};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub class_index: i64,
    pub probabilities: Option<Vec<f32>>,
    /// Categorical values the model has no column for
    pub dropped: Vec<DroppedIndicator>,
    /// Backend that produced the class ("onnx", "tree_ensemble")
    pub method: String,
    pub inference_time_us: u64,
}

/// Engine status for the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_name: String,
    pub backend: String,
    pub bucketing: BucketingProfile,
    pub age_banding: AgeBanding,
    pub fallback_labels: bool,
    pub avg_latency_ms: f32,
    pub prediction_count: u64,
    pub failure_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("record does not match the training schema: {0}")]
    Align(#[from] AlignError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    UnknownClass(#[from] UnknownClass),
}

// ============================================================================
// PREDICTOR
// ============================================================================

#[derive(Debug)]
pub struct Predictor {
    bundle: ModelBundle,
    bucketer: Bucketer,
    decoder: LabelDecoder,
    config: PipelineConfig,
    latency_sum_us: AtomicU64,
    prediction_count: AtomicU64,
    failure_count: AtomicU64,
}

impl Predictor {
    pub fn new(bundle: ModelBundle, config: PipelineConfig) -> Self {
        if config.bucketing == BucketingProfile::VariantA
            && config.age_banding == AgeBanding::SourceCompatible
        {
            log::warn!(
                "Age banding is source-compatible: every age is bucketed as '0-20'. \
                 This matches a known defect in the legacy banding rules; use 'decades' unless the model was trained on it"
            );
        }

        let decoder = LabelDecoder::new(
            bundle.label_classes().map(<[String]>::to_vec),
            config.fallback_labels.clone(),
        );

        log::info!(
            "Predictor ready: bucketing {}, age banding {}",
            config.bucketing.as_str(),
            config.age_banding.as_str()
        );

        Self {
            bundle,
            bucketer: Bucketer::new(config.bucketing, config.age_banding),
            decoder,
            config,
            latency_sum_us: AtomicU64::new(0),
            prediction_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Load the bundle at `path` and build a predictor on it
    pub fn load(path: impl AsRef<Path>, config: PipelineConfig) -> Result<Self, BundleError> {
        Ok(Self::new(ModelBundle::load(path)?, config))
    }

    pub fn bucket(&self, raw: &RawRecord) -> BucketedRecord {
        self.bucketer.bucket(raw)
    }

    pub fn align(&self, bucketed: &BucketedRecord) -> Result<Alignment, AlignError> {
        align(self.bundle.schema(), bucketed)
    }

    /// Run one record end to end. Yields exactly one label or one error.
    pub fn predict(&self, raw: &RawRecord) -> Result<Prediction, PredictError> {
        let result = self.run(raw);
        match &result {
            Ok(prediction) => {
                self.latency_sum_us
                    .fetch_add(prediction.inference_time_us, Ordering::Relaxed);
                self.prediction_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                log::warn!("Prediction failed: {}", e);
                self.failure_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn run(&self, raw: &RawRecord) -> Result<Prediction, PredictError> {
        let start_time = Instant::now();

        let bucketed = self.bucket(raw);
        let Alignment { vector, dropped } = self.align(&bucketed)?;
        vector.validate(self.bundle.schema()).map_err(AlignError::from)?;

        log::debug!("Aligned vector: {}", vector.to_log_entry(self.bundle.schema()));

        let classifier = self.bundle.classifier();
        let output = classifier.predict(vector.as_slice())?;
        let label = self.decoder.decode(output.class_index)?;

        let inference_time_us = start_time.elapsed().as_micros() as u64;
        log::info!(
            "Predicted '{}' (class {}) in {}us",
            label,
            output.class_index,
            inference_time_us
        );

        Ok(Prediction {
            label,
            class_index: output.class_index,
            probabilities: output.probabilities,
            dropped,
            method: classifier.name().to_string(),
            inference_time_us,
        })
    }

    pub fn schema(&self) -> &TrainingSchema {
        self.bundle.schema()
    }

    pub fn layout_info(&self) -> LayoutInfo {
        self.bundle.schema().layout_info()
    }

    pub fn metadata(&self) -> &BundleMetadata {
        self.bundle.metadata()
    }

    pub fn decoder(&self) -> &LabelDecoder {
        &self.decoder
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.prediction_count.load(Ordering::Relaxed);
        let avg = if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        };

        EngineStatus {
            model_name: self.metadata().name.clone(),
            backend: self.metadata().backend.clone(),
            bucketing: self.config.bucketing,
            age_banding: self.config.age_banding,
            fallback_labels: self.decoder.is_fallback(),
            avg_latency_ms: avg,
            prediction_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::Field;
    use crate::logic::model::{Classifier, ClassifierOutput};

    /// Returns a fixed class and remembers nothing
    struct FixedClassifier {
        class_index: i64,
        width: usize,
    }

    impl Classifier for FixedClassifier {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn n_features(&self) -> Option<usize> {
            Some(self.width)
        }

        fn predict(&self, _features: &[f32]) -> Result<ClassifierOutput, InferenceError> {
            Ok(ClassifierOutput {
                class_index: self.class_index,
                probabilities: None,
            })
        }
    }

    /// Long stay whenever the surgery indicator (column 1) is set
    struct SurgeryClassifier;

    impl Classifier for SurgeryClassifier {
        fn name(&self) -> &'static str {
            "surgery"
        }

        fn n_features(&self) -> Option<usize> {
            None
        }

        fn predict(&self, features: &[f32]) -> Result<ClassifierOutput, InferenceError> {
            Ok(ClassifierOutput {
                class_index: i64::from(features[1] == 1.0),
                probabilities: None,
            })
        }
    }

    fn columns() -> Vec<&'static str> {
        vec![
            "Bed_Grade",
            "Department_TB & Chest disease + surgery",
            "Department_gynecology",
            "Available_Extra_Rooms_in_Hospital_0-2 rooms",
            "Patient_Visitors_0-2 visitors",
            "Ward_Type_Q",
            "Age_21-30",
        ]
    }

    fn predictor(classifier: Box<dyn Classifier>, classes: Option<Vec<String>>) -> Predictor {
        let schema = TrainingSchema::new(columns()).unwrap();
        let bundle = ModelBundle::from_parts("test", schema, classifier, classes).unwrap();
        Predictor::new(bundle, PipelineConfig::default())
    }

    fn scenario_record() -> RawRecord {
        RawRecord::new()
            .with(Field::ExtraRooms, "2")
            .with(Field::Visitors, "1")
            .with(Field::WardType, "Q")
            .with(Field::Department, "surgery")
            .with(Field::Age, 24)
            .with(Field::BedGrade, 3.0)
    }

    #[test]
    fn test_end_to_end_fallback_label() {
        let predictor = predictor(Box::new(SurgeryClassifier), None);

        let prediction = predictor.predict(&scenario_record()).unwrap();

        assert_eq!(prediction.class_index, 1);
        assert_eq!(prediction.label, "31 days or more");
        assert_eq!(prediction.method, "surgery");
        assert!(prediction.dropped.is_empty());

        let bucketed = predictor.bucket(&scenario_record());
        let vector = predictor.align(&bucketed).unwrap().vector;
        assert_eq!(vector.values, vec![3.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_short_stay_fallback_label() {
        let predictor = predictor(Box::new(SurgeryClassifier), None);
        let record = scenario_record().with(Field::Department, "gynecology");

        let prediction = predictor.predict(&record).unwrap();

        assert_eq!(prediction.class_index, 0);
        assert_eq!(prediction.label, "30 days or less");
    }

    #[test]
    fn test_decodes_with_label_classes() {
        let classes = vec!["short".to_string(), "long".to_string()];
        let predictor = predictor(
            Box::new(FixedClassifier { class_index: 1, width: 7 }),
            Some(classes),
        );

        assert_eq!(predictor.predict(&scenario_record()).unwrap().label, "long");
        assert!(!predictor.status().fallback_labels);
    }

    #[test]
    fn test_unknown_class_is_an_error() {
        let predictor = predictor(
            Box::new(FixedClassifier { class_index: 5, width: 7 }),
            Some(vec!["short".to_string(), "long".to_string()]),
        );

        assert!(matches!(
            predictor.predict(&scenario_record()),
            Err(PredictError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_unseen_bucket_still_predicts() {
        let predictor = predictor(Box::new(SurgeryClassifier), None);
        let record = scenario_record().with(Field::ExtraRooms, "5 or more");

        let prediction = predictor.predict(&record).unwrap();

        assert_eq!(prediction.label, "31 days or more");
        assert_eq!(prediction.dropped.len(), 1);
        assert_eq!(prediction.dropped[0].value, "5 or more rooms");
    }

    #[test]
    fn test_missing_field_reports_failure() {
        let predictor = predictor(Box::new(SurgeryClassifier), None);
        let mut record = scenario_record();
        record.remove(Field::BedGrade.column_name());

        let err = predictor.predict(&record).unwrap_err();

        assert!(matches!(
            err,
            PredictError::Align(AlignError::MissingField { field: Field::BedGrade })
        ));
        let status = predictor.status();
        assert_eq!(status.failure_count, 1);
        assert_eq!(status.prediction_count, 0);
    }

    #[test]
    fn test_status_counts_predictions() {
        let predictor = predictor(Box::new(SurgeryClassifier), None);
        predictor.predict(&scenario_record()).unwrap();
        predictor.predict(&scenario_record()).unwrap();

        let status = predictor.status();
        assert_eq!(status.prediction_count, 2);
        assert_eq!(status.model_name, "test");
        assert!(status.fallback_labels);
    }
}

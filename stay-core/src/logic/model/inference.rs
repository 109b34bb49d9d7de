//! Inference Engine - Classifier Backends
//!
//! The pipeline only sees the [`Classifier`] trait, so the backend can be
//! swapped without touching bucketing or alignment. The ONNX backend runs
//! an exported model through ONNX Runtime; the tree ensemble backend lives
//! in `trees.rs`.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Raw classifier output for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierOutput {
    pub class_index: i64,
    /// Per-class probabilities, when the backend exposes them
    pub probabilities: Option<Vec<f32>>,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("inference failed: {0}")]
    Backend(String),

    #[error("unexpected model output: {0}")]
    Output(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for classifier backends (ONNX, native trees, ...)
pub trait Classifier: Send + Sync {
    /// Backend name for status reporting
    fn name(&self) -> &'static str;

    /// Input width the model was built for, if the backend knows it
    fn n_features(&self) -> Option<usize>;

    /// Predict one row laid out in training column order
    fn predict(&self, features: &[f32]) -> Result<ClassifierOutput, InferenceError>;
}

/// Check the row width before handing it to a backend
pub fn check_width(expected: Option<usize>, features: &[f32]) -> Result<(), InferenceError> {
    match expected {
        Some(expected) if expected != features.len() => Err(InferenceError::WidthMismatch {
            expected,
            actual: features.len(),
        }),
        _ => Ok(()),
    }
}

/// Index of the largest score (first one wins ties)
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Classifier exported to ONNX (e.g. skl2onnx), run on the CPU
pub struct OnnxClassifier {
    session: Mutex<Session>,
    model_path: String,
    n_features: Option<usize>,
    label_output: String,
    probability_output: Option<String>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("model_path", &self.model_path)
            .field("n_features", &self.n_features)
            .field("label_output", &self.label_output)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: &Path, n_features: Option<usize>) -> Result<Self, InferenceError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError::InvalidModel(format!(
                "model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Backend(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Backend(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::InvalidModel(format!("Failed to load model: {}", e)))?;

        Self::from_session(session, model_path.display().to_string(), n_features)
    }

    fn from_session(
        session: Session,
        model_path: String,
        n_features: Option<usize>,
    ) -> Result<Self, InferenceError> {
        let label_output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::InvalidModel("No output defined".to_string()))?;
        let probability_output = session.outputs.get(1).map(|o| o.name.clone());

        log::info!(
            "ONNX model loaded successfully (outputs: {}{})",
            label_output,
            probability_output
                .as_deref()
                .map(|p| format!(", {}", p))
                .unwrap_or_default()
        );

        Ok(Self {
            session: Mutex::new(session),
            model_path,
            n_features,
            label_output,
            probability_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    fn predict(&self, features: &[f32]) -> Result<ClassifierOutput, InferenceError> {
        check_width(self.n_features, features)?;

        let input_array = Array2::<f32>::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| InferenceError::Backend(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Backend(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        let output = outputs
            .get(&self.label_output)
            .ok_or_else(|| InferenceError::Output(format!("missing output '{}'", self.label_output)))?;

        // Label tensor (sklearn exports) or a score tensor (everything else)
        let (class_index, scores) = if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            let class_index = labels
                .first()
                .copied()
                .ok_or_else(|| InferenceError::Output("empty label tensor".to_string()))?;
            (class_index, None)
        } else {
            let (_, data) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Output(format!("Extract error: {}", e)))?;
            match data {
                [] => return Err(InferenceError::Output("empty score tensor".to_string())),
                [score] => (i64::from(*score > 0.5), Some(vec![1.0 - score, *score])),
                scores => {
                    let best = argmax(scores).unwrap_or(0) as i64;
                    (best, Some(scores.to_vec()))
                }
            }
        };

        // ZipMap probability outputs are maps, not tensors; skip those
        let probabilities = scores.or_else(|| {
            self.probability_output
                .as_ref()
                .and_then(|name| outputs.get(name))
                .and_then(|value| value.try_extract_tensor::<f32>().ok())
                .map(|(_, data)| data.to_vec())
        });

        Ok(ClassifierOutput {
            class_index,
            probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_check_width() {
        assert!(check_width(None, &[1.0]).is_ok());
        assert!(check_width(Some(2), &[1.0, 0.0]).is_ok());
        assert_eq!(
            check_width(Some(3), &[1.0]),
            Err(InferenceError::WidthMismatch { expected: 3, actual: 1 })
        );
    }

    #[test]
    fn test_onnx_missing_file() {
        let err = OnnxClassifier::load(Path::new("/nonexistent/model.onnx"), Some(4)).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidModel(_)));
    }
}

//! Model Module - Bundle Loading & Inference
//!
//! Keeps the model behind the [`Classifier`] trait so bundles can ship
//! either an ONNX export or a native tree ensemble.

pub mod bundle;
pub mod inference;
pub mod labels;
pub mod trees;

// Re-export common types
pub use bundle::{BundleError, BundleManifest, BundleMetadata, ModelBundle, ModelSource};
pub use inference::{Classifier, ClassifierOutput, InferenceError, OnnxClassifier};
pub use labels::{LabelDecoder, UnknownClass};
pub use trees::{TreeEnsemble, TreeEnsembleClassifier};

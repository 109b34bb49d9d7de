//! Hospital Stay Predictor - Core
//!
//! Turns one admission record into the feature vector a trained
//! length-of-stay classifier expects and runs the prediction.
//!
//! ```text
//! RawRecord ──bucket──▶ BucketedRecord ──align──▶ AlignedVector ──predict──▶ label
//!                                          ▲                        ▲
//!                                   TrainingSchema              Classifier
//!                                          └──── ModelBundle ───────┘
//! ```
//!
//! - `logic/features/` - field bucketing, training schema, alignment
//! - `logic/model/` - bundle loading, inference backends, label decoding
//! - `logic/pipeline.rs` - the one-shot [`Predictor`]

pub mod constants;
pub mod logic;

pub use logic::config::{AgeBanding, BucketingProfile, FallbackLabels, PipelineConfig};
pub use logic::features::{
    AlignError, AlignedVector, BucketedRecord, DroppedIndicator, Field, FieldValue, FormOptions,
    LayoutInfo, RawRecord, TrainingSchema,
};
pub use logic::model::{
    BundleError, Classifier, ClassifierOutput, InferenceError, LabelDecoder, ModelBundle,
};
pub use logic::pipeline::{PredictError, Prediction, Predictor};

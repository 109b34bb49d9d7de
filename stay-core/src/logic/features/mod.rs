//! Features Module - Record → Model Input
//!
//! - `record` - fields, values, raw and bucketed records
//! - `bucketing` - per-field bucket rules
//! - `layout` - training schema and its lookup tables
//! - `vector` - alignment into the training column space
//! - `form` - option lists of the admission form

pub mod bucketing;
pub mod form;
pub mod layout;
pub mod record;
pub mod vector;


// Re-export common types
pub use bucketing::Bucketer;
pub use form::{FormOptions, IntRange};
pub use layout::{
    classify_column, compute_layout_hash, ColumnRole, LayoutInfo, LayoutMismatchError,
    SchemaError, TrainingSchema, LAYOUT_VERSION,
};
pub use record::{BucketedRecord, Field, FieldValue, RawRecord};
pub use vector::{align, AlignError, AlignedVector, Alignment, DroppedIndicator};

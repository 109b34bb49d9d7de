//! Aligned Feature Vector - Model Input
//!
//! Expands a bucketed record into the training column space: start from an
//! all-zero vector shaped like the schema, copy passthrough values, set the
//! indicator of every categorical level that was seen at training time.
//!
//! A level the model never saw has no column. It contributes nothing and is
//! reported as a [`DroppedIndicator`] instead of failing the request.

use serde::{Deserialize, Serialize};

use super::layout::{LayoutMismatchError, TrainingSchema, LAYOUT_VERSION};
use super::record::{BucketedRecord, Field};

// ============================================================================
// ERRORS
// ============================================================================

/// Record does not fit the training schema
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AlignError {
    #[error("field '{field}' is required by the training schema but missing from the record")]
    MissingField { field: Field },

    #[error("field '{field}' must be numeric, got '{value}'")]
    NonNumericValue { field: Field, value: String },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
}

/// Categorical value with no training column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedIndicator {
    pub field: String,
    pub value: String,
}

// ============================================================================
// ALIGNED VECTOR
// ============================================================================

/// Feature values in training column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedVector {
    /// Layout hash format version
    pub version: u8,
    /// Hash of the schema the values are laid out for
    pub layout_hash: u32,
    pub values: Vec<f32>,
}

impl AlignedVector {
    /// Zeroed vector shaped like `schema`
    pub fn zeros(schema: &TrainingSchema) -> Self {
        Self {
            version: LAYOUT_VERSION,
            layout_hash: schema.hash(),
            values: vec![0.0; schema.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by column name
    pub fn get_by_name(&self, schema: &TrainingSchema, name: &str) -> Option<f32> {
        schema.column_index(name).and_then(|i| self.get(i))
    }

    /// Check this vector was built for `schema`
    pub fn validate(&self, schema: &TrainingSchema) -> Result<(), LayoutMismatchError> {
        schema.validate_layout(self.version, self.layout_hash)
    }

    /// Non-zero entries with their column names, in column order
    pub fn nonzero<'a>(&'a self, schema: &'a TrainingSchema) -> Vec<(&'a str, f32)> {
        schema
            .columns()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| **v != 0.0)
            .map(|(name, v)| (name.as_str(), *v))
            .collect()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, schema: &TrainingSchema) -> serde_json::Value {
        serde_json::json!({
            "layout_version": self.version,
            "layout_hash": self.layout_hash,
            "column_count": self.values.len(),
            "nonzero": self.nonzero(schema)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

/// Aligned vector plus what could not be represented
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub vector: AlignedVector,
    pub dropped: Vec<DroppedIndicator>,
}

// ============================================================================
// ALIGNMENT
// ============================================================================

/// Lay a bucketed record out in the schema's column space
pub fn align(schema: &TrainingSchema, record: &BucketedRecord) -> Result<Alignment, AlignError> {
    let mut vector = AlignedVector::zeros(schema);
    let mut dropped = Vec::new();

    // Passthrough columns have no neutral default
    for (field, index) in schema.passthrough_fields() {
        let value = record
            .get_field(field)
            .ok_or(AlignError::MissingField { field })?;
        let number = value.as_f64().ok_or_else(|| AlignError::NonNumericValue {
            field,
            value: value.render(),
        })?;
        vector.values[index] = number as f32;
    }

    for (name, value) in record.iter() {
        let Some(field) = Field::from_column_name(name) else {
            log::debug!("Ignoring unrecognised field '{}'", name);
            continue;
        };
        if schema.passthrough_index(field).is_some() {
            continue;
        }
        if !schema.uses_field(field) {
            log::debug!("Field '{}' is not used by the model", field);
            continue;
        }

        let level = value.render();
        match schema.indicator_index(field, &level) {
            Some(index) => vector.values[index] = 1.0,
            None => {
                log::warn!(
                    "No training column for {}='{}', the field contributes no indicator",
                    field,
                    level
                );
                dropped.push(DroppedIndicator {
                    field: field.column_name().to_string(),
                    value: level,
                });
            }
        }
    }

    Ok(Alignment { vector, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::record::FieldValue;

    fn schema() -> TrainingSchema {
        TrainingSchema::new([
            "Bed_Grade",
            "Available_Extra_Rooms_in_Hospital_0-2 rooms",
            "Available_Extra_Rooms_in_Hospital_3 rooms",
            "Department_gynecology",
            "Department_radiotherapy",
        ])
        .unwrap()
    }

    #[test]
    fn test_align_sets_passthrough_and_indicators() {
        let record = BucketedRecord::new()
            .with(Field::BedGrade, 3.0)
            .with(Field::ExtraRooms, "3 rooms")
            .with(Field::Department, "radiotherapy");

        let alignment = align(&schema(), &record).unwrap();

        assert_eq!(alignment.vector.values, vec![3.0, 0.0, 1.0, 0.0, 1.0]);
        assert!(alignment.dropped.is_empty());
    }

    #[test]
    fn test_unseen_level_is_dropped_not_raised() {
        let record = BucketedRecord::new()
            .with(Field::BedGrade, 1.0)
            .with(Field::ExtraRooms, "5 or more rooms");

        let alignment = align(&schema(), &record).unwrap();

        assert_eq!(alignment.vector.values, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            alignment.dropped,
            vec![DroppedIndicator {
                field: "Available_Extra_Rooms_in_Hospital".to_string(),
                value: "5 or more rooms".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_passthrough_fails() {
        let record = BucketedRecord::new().with(Field::Department, "gynecology");
        assert_eq!(
            align(&schema(), &record).unwrap_err(),
            AlignError::MissingField { field: Field::BedGrade }
        );
    }

    #[test]
    fn test_non_numeric_passthrough_fails() {
        let record = BucketedRecord::new().with(Field::BedGrade, "high");
        assert!(matches!(
            align(&schema(), &record),
            Err(AlignError::NonNumericValue { field: Field::BedGrade, .. })
        ));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut record = BucketedRecord::new().with(Field::BedGrade, FieldValue::Int(2));
        record.insert("Notes", "walk-in");
        record.set(Field::Age, "41-50");

        let alignment = align(&schema(), &record).unwrap();

        assert_eq!(alignment.vector.len(), 5);
        assert_eq!(alignment.vector.get(0), Some(2.0));
        assert!(alignment.dropped.is_empty());
    }

    #[test]
    fn test_vector_validates_against_its_schema() {
        let schema = schema();
        let vector = AlignedVector::zeros(&schema);
        assert!(vector.validate(&schema).is_ok());

        let other = TrainingSchema::new(["Bed_Grade"]).unwrap();
        assert!(vector.validate(&other).is_err());
    }

    #[test]
    fn test_nonzero_and_log_entry() {
        let schema = schema();
        let record = BucketedRecord::new()
            .with(Field::BedGrade, 4.0)
            .with(Field::Department, "gynecology");
        let vector = align(&schema, &record).unwrap().vector;

        assert_eq!(
            vector.nonzero(&schema),
            vec![("Bed_Grade", 4.0), ("Department_gynecology", 1.0)]
        );
        let entry = vector.to_log_entry(&schema);
        assert_eq!(entry["column_count"], 5);
        assert_eq!(entry["nonzero"]["Department_gynecology"], 1.0);
        assert_eq!(vector.get_by_name(&schema, "Bed_Grade"), Some(4.0));
    }
}

//! Admission Records
//!
//! A record is a single form submission: field name → value. Records are
//! keyed by column name (not by [`Field`]) so that fields the pipeline does
//! not know about survive bucketing untouched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// FIELDS
// ============================================================================

/// Recognised admission fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Hospital,
    HospitalType,
    HospitalCity,
    HospitalRegion,
    ExtraRooms,
    Department,
    WardType,
    WardFacility,
    BedGrade,
    AdmissionType,
    IllnessSeverity,
    Visitors,
    Age,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 13] = [
        Field::Hospital,
        Field::HospitalType,
        Field::HospitalCity,
        Field::HospitalRegion,
        Field::ExtraRooms,
        Field::Department,
        Field::WardType,
        Field::WardFacility,
        Field::BedGrade,
        Field::AdmissionType,
        Field::IllnessSeverity,
        Field::Visitors,
        Field::Age,
    ];

    /// Column name used by the training data
    pub fn column_name(&self) -> &'static str {
        match self {
            Field::Hospital => "Hospital",
            Field::HospitalType => "Hospital_type",
            Field::HospitalCity => "Hospital_city",
            Field::HospitalRegion => "Hospital_region",
            Field::ExtraRooms => "Available_Extra_Rooms_in_Hospital",
            Field::Department => "Department",
            Field::WardType => "Ward_Type",
            Field::WardFacility => "Ward_Facility",
            Field::BedGrade => "Bed_Grade",
            Field::AdmissionType => "Type of Admission",
            Field::IllnessSeverity => "Illness_Severity",
            Field::Visitors => "Patient_Visitors",
            Field::Age => "Age",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// One field value as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Numeric view, used for passthrough columns
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Integer view; floats only when they carry no fraction
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            FieldValue::Float(_) => None,
            FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    /// Text form used as an indicator column suffix.
    ///
    /// Integral floats keep one decimal place (`2.0`), matching how the
    /// training data rendered its dummy columns.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                format!("{:.1}", v)
            }
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

// ============================================================================
// RECORDS
// ============================================================================

macro_rules! record_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            fields: BTreeMap<String, FieldValue>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn get(&self, name: &str) -> Option<&FieldValue> {
                self.fields.get(name)
            }

            pub fn get_field(&self, field: Field) -> Option<&FieldValue> {
                self.fields.get(field.column_name())
            }

            pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
                self.fields.insert(name.into(), value.into());
            }

            pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
                self.insert(field.column_name(), value);
            }

            /// Builder-style [`set`](Self::set)
            pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
                self.set(field, value);
                self
            }

            pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
                self.fields.remove(name)
            }

            pub fn contains(&self, name: &str) -> bool {
                self.fields.contains_key(name)
            }

            pub fn len(&self) -> usize {
                self.fields.len()
            }

            pub fn is_empty(&self) -> bool {
                self.fields.is_empty()
            }

            pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
                self.fields.iter().map(|(k, v)| (k.as_str(), v))
            }
        }

        impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for $name {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self {
                    fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
                }
            }
        }
    };
}

record_type!(
    /// Record as collected from the form
    RawRecord
);

record_type!(
    /// Record after bucketing; recognised fields hold their bucket labels
    BucketedRecord
);

//! Training Schema - Column Layout the Model Was Trained On
//!
//! **The schema is frozen at training time and loaded from the bundle.**
//!
//! ## Rules:
//! 1. Column order is the model's input order and never changes at runtime
//! 2. Alignment never adds or drops a column
//! 3. Every column is classified once, at load time
//!
//! A column is either a passthrough numeric field (`Bed_Grade`), an
//! indicator for one categorical level (`Department_gynecology`), or a
//! column no admission field can produce (always 0).

use std::collections::{HashMap, HashSet};

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::record::Field;

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Layout hash format version
/// MUST be incremented when the hashing scheme changes
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// COLUMN ROLES
// ============================================================================

/// What a schema column holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ColumnRole {
    /// Numeric value copied from the record
    Passthrough { field: Field },
    /// 1 when the bucketed field equals `value`, 0 otherwise
    Indicator { field: Field, value: String },
    /// Not produced by any admission field
    Unmapped,
}

/// Classify a column name against the known fields.
///
/// Exact field names are passthrough. Otherwise the longest field name
/// followed by `_` wins, so `Hospital_type_2` is hospital type `2`, not
/// hospital `type_2`.
pub fn classify_column(name: &str) -> ColumnRole {
    if let Some(field) = Field::from_column_name(name) {
        return ColumnRole::Passthrough { field };
    }

    Field::ALL
        .iter()
        .filter_map(|field| {
            let prefix = field.column_name();
            name.strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|value| (prefix.len(), *field, value))
        })
        .max_by_key(|(len, _, _)| *len)
        .map(|(_, field, value)| ColumnRole::Indicator {
            field,
            value: value.to_string(),
        })
        .unwrap_or(ColumnRole::Unmapped)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a column layout
/// Used to detect layout mismatches between bundle and vector
pub fn compute_layout_hash<S: AsRef<str>>(columns: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[LAYOUT_VERSION]);

    for name in columns {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error building a schema from a column list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("training schema has no columns")]
    Empty,

    #[error("training schema lists column '{0}' more than once")]
    DuplicateColumn(String),
}

/// Error when a layout hash doesn't match the schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

// ============================================================================
// TRAINING SCHEMA
// ============================================================================

/// Ordered training columns plus the lookup tables alignment runs on
#[derive(Debug, Clone)]
pub struct TrainingSchema {
    columns: Vec<String>,
    roles: Vec<ColumnRole>,
    passthrough: HashMap<Field, usize>,
    indicators: HashMap<(Field, String), usize>,
    hash: u32,
}

impl TrainingSchema {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, SchemaError> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()));
            }
        }

        let mut roles = Vec::with_capacity(columns.len());
        let mut passthrough = HashMap::new();
        let mut indicators = HashMap::new();

        for (index, name) in columns.iter().enumerate() {
            let role = classify_column(name);
            match &role {
                ColumnRole::Passthrough { field } => {
                    passthrough.insert(*field, index);
                }
                ColumnRole::Indicator { field, value } => {
                    indicators.insert((*field, value.clone()), index);
                }
                ColumnRole::Unmapped => {
                    log::warn!("Training column '{}' matches no admission field, it will stay 0", name);
                }
            }
            roles.push(role);
        }

        let hash = compute_layout_hash(&columns);
        log::debug!(
            "Training schema: {} columns ({} passthrough, {} indicators), hash {:08x}",
            columns.len(),
            passthrough.len(),
            indicators.len(),
            hash
        );

        Ok(Self {
            columns,
            roles,
            passthrough,
            indicators,
            hash,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn role(&self, index: usize) -> Option<&ColumnRole> {
        self.roles.get(index)
    }

    /// Get column index by name (O(n), only used for inspection)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Passthrough fields in column order
    pub fn passthrough_fields(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.roles.iter().enumerate().filter_map(|(i, role)| match role {
            ColumnRole::Passthrough { field } => Some((*field, i)),
            _ => None,
        })
    }

    pub fn passthrough_index(&self, field: Field) -> Option<usize> {
        self.passthrough.get(&field).copied()
    }

    pub fn indicator_index(&self, field: Field, value: &str) -> Option<usize> {
        self.indicators.get(&(field, value.to_string())).copied()
    }

    /// Whether any column is fed by this field
    pub fn uses_field(&self, field: Field) -> bool {
        self.passthrough.contains_key(&field) || self.indicators.keys().any(|(f, _)| *f == field)
    }

    /// Levels seen at training time for a categorical field, in column order
    pub fn levels(&self, field: Field) -> Vec<&str> {
        self.roles
            .iter()
            .filter_map(|role| match role {
                ColumnRole::Indicator { field: f, value } if *f == field => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Validate an incoming layout fingerprint against this schema
    pub fn validate_layout(&self, version: u8, hash: u32) -> Result<(), LayoutMismatchError> {
        if version != LAYOUT_VERSION || hash != self.hash {
            return Err(LayoutMismatchError {
                expected_version: LAYOUT_VERSION,
                expected_hash: self.hash,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    pub fn layout_info(&self) -> LayoutInfo {
        LayoutInfo {
            version: LAYOUT_VERSION,
            hash: self.hash,
            column_count: self.columns.len(),
            column_names: self.columns.clone(),
            passthrough_columns: self
                .passthrough_fields()
                .map(|(field, _)| field.column_name().to_string())
                .collect(),
            unmapped_columns: self
                .roles
                .iter()
                .zip(&self.columns)
                .filter(|(role, _)| **role == ColumnRole::Unmapped)
                .map(|(_, name)| name.clone())
                .collect(),
        }
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub passthrough_columns: Vec<String>,
    pub unmapped_columns: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================

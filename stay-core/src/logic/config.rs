//! Pipeline Configuration
//!
//! Everything that changes how a record is bucketed or how a class index is
//! turned into a label. Built once, then read-only.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{LONG_STAY_CLASS, LONG_STAY_LABEL, SHORT_STAY_LABEL};

/// Which set of bucketing rules the model was trained with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BucketingProfile {
    /// Numeric age banded into decades, TB & Chest disease merged with surgery
    #[default]
    VariantA,
    /// Age arrives pre-banded, departments kept as-is
    VariantB,
}

/// How a numeric age is banded under [`BucketingProfile::VariantA`]
///
/// The rules this model was trained with compared the band bounds with `or`
/// instead of `and`, so every age landed in `"0-20"`. Whether the deployed
/// model saw that collapse or proper decades cannot be told from the rules
/// alone, so both are available and the collapse has to be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AgeBanding {
    /// Inclusive bands: 0-20, 21-30, ..., 71-80, 81-100
    #[default]
    Decades,
    /// Every age maps to "0-20"
    SourceCompatible,
}

impl BucketingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VariantA => "variant_a",
            Self::VariantB => "variant_b",
        }
    }
}

impl AgeBanding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decades => "decades",
            Self::SourceCompatible => "source_compatible",
        }
    }
}

/// Error for unknown profile / banding names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseConfigError {
    pub kind: &'static str,
    pub value: String,
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for BucketingProfile {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "variant_a" | "a" => Ok(Self::VariantA),
            "variant_b" | "b" => Ok(Self::VariantB),
            _ => Err(ParseConfigError {
                kind: "bucketing profile",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for AgeBanding {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "decades" => Ok(Self::Decades),
            "source_compatible" => Ok(Self::SourceCompatible),
            _ => Err(ParseConfigError {
                kind: "age banding",
                value: s.to_string(),
            }),
        }
    }
}

/// Last-resort class → label table, used only when the bundle has no
/// label classes. Encodes the training-time convention of the shipped model
/// (binary collapse of the stay target) and is never inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackLabels {
    /// Class index mapped to `positive_label`
    pub positive_class: i64,
    pub positive_label: String,
    /// Label for every other class index
    pub negative_label: String,
}

impl Default for FallbackLabels {
    fn default() -> Self {
        Self {
            positive_class: LONG_STAY_CLASS,
            positive_label: LONG_STAY_LABEL.to_string(),
            negative_label: SHORT_STAY_LABEL.to_string(),
        }
    }
}

impl FallbackLabels {
    pub fn label_for(&self, class_index: i64) -> &str {
        if class_index == self.positive_class {
            &self.positive_label
        } else {
            &self.negative_label
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub bucketing: BucketingProfile,
    pub age_banding: AgeBanding,
    pub fallback_labels: FallbackLabels,
}

impl PipelineConfig {
    pub fn new(bucketing: BucketingProfile, age_banding: AgeBanding) -> Self {
        Self {
            bucketing,
            age_banding,
            ..Default::default()
        }
    }
}

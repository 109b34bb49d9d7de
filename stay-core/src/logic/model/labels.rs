//! Label Decoding
//!
//! Maps a class index back to a readable stay category: through the label
//! classes saved with the model when present, otherwise through the
//! configured [`FallbackLabels`] table.

use serde::{Deserialize, Serialize};

use crate::logic::config::FallbackLabels;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("class index {class_index} is outside the {known} label classes of the model")]
pub struct UnknownClass {
    pub class_index: i64,
    pub known: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelDecoder {
    /// Label encoder classes, index = encoded value
    Classes { classes: Vec<String> },
    /// No encoder bundled
    Fallback { labels: FallbackLabels },
}

impl LabelDecoder {
    pub fn new(classes: Option<Vec<String>>, fallback: FallbackLabels) -> Self {
        match classes {
            Some(classes) if !classes.is_empty() => LabelDecoder::Classes { classes },
            _ => {
                log::warn!(
                    "Model bundle has no label classes, using fallback labels (class {} = '{}', otherwise '{}')",
                    fallback.positive_class,
                    fallback.positive_label,
                    fallback.negative_label
                );
                LabelDecoder::Fallback { labels: fallback }
            }
        }
    }

    pub fn decode(&self, class_index: i64) -> Result<String, UnknownClass> {
        match self {
            LabelDecoder::Classes { classes } => usize::try_from(class_index)
                .ok()
                .and_then(|i| classes.get(i))
                .cloned()
                .ok_or(UnknownClass {
                    class_index,
                    known: classes.len(),
                }),
            LabelDecoder::Fallback { labels } => Ok(labels.label_for(class_index).to_string()),
        }
    }

    pub fn classes(&self) -> Option<&[String]> {
        match self {
            LabelDecoder::Classes { classes } => Some(classes),
            LabelDecoder::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LabelDecoder::Fallback { .. })
    }
}

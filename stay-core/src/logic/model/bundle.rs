//! Model Bundle - Trained Model + Frozen Schema
//!
//! A bundle directory holds `bundle.json`, which names the training columns,
//! the optional label classes and the model file. It is loaded once at
//! startup and never changes afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::BUNDLE_MANIFEST;
use crate::logic::features::{LayoutMismatchError, SchemaError, TrainingSchema, LAYOUT_VERSION};

use super::inference::{Classifier, InferenceError, OnnxClassifier};
use super::trees::TreeEnsembleClassifier;

/// Supported manifest format
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

// ============================================================================
// MANIFEST
// ============================================================================

/// Where the classifier comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSource {
    Onnx { path: PathBuf },
    TreeEnsemble { path: PathBuf },
}

impl ModelSource {
    pub fn path(&self) -> &Path {
        match self {
            ModelSource::Onnx { path } | ModelSource::TreeEnsemble { path } => path,
        }
    }
}

fn default_format_version() -> u32 {
    BUNDLE_FORMAT_VERSION
}

/// Contents of `bundle.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub name: String,
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub train_columns: Vec<String>,
    #[serde(default)]
    pub label_classes: Option<Vec<String>>,
    /// Pins the column layout; loading fails when the columns hash differently
    #[serde(default)]
    pub layout_hash: Option<u32>,
    pub model: ModelSource,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported bundle format version {0} (expected {})", BUNDLE_FORMAT_VERSION)]
    UnsupportedVersion(u32),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("model file not found: {}", .0.display())]
    ModelMissing(PathBuf),

    #[error("model has {model} inputs but the bundle lists {columns} training columns")]
    WidthMismatch { model: usize, columns: usize },

    #[error(transparent)]
    Model(#[from] InferenceError),
}

// ============================================================================
// BUNDLE
// ============================================================================

/// Bundle metadata for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    pub name: String,
    pub path: String,
    pub backend: String,
    pub column_count: usize,
    pub layout_hash: u32,
    pub loaded_at: DateTime<Utc>,
}

/// Loaded, immutable model bundle
pub struct ModelBundle {
    schema: TrainingSchema,
    classifier: Box<dyn Classifier>,
    label_classes: Option<Vec<String>>,
    metadata: BundleMetadata,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("metadata", &self.metadata)
            .field("label_classes", &self.label_classes)
            .finish()
    }
}

impl ModelBundle {
    /// Load from a bundle directory (or directly from its manifest file)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let (dir, manifest_path) = if path.is_dir() {
            (path.to_path_buf(), path.join(BUNDLE_MANIFEST))
        } else {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (dir, path.to_path_buf())
        };

        log::info!("Loading model bundle from: {}", manifest_path.display());

        let text = fs::read_to_string(&manifest_path).map_err(|source| BundleError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest: BundleManifest =
            serde_json::from_str(&text).map_err(|source| BundleError::Json {
                path: manifest_path.clone(),
                source,
            })?;

        Self::from_manifest(manifest, &dir)
    }

    /// Build from a parsed manifest; model paths resolve against `dir`
    pub fn from_manifest(manifest: BundleManifest, dir: &Path) -> Result<Self, BundleError> {
        if manifest.format_version != BUNDLE_FORMAT_VERSION {
            return Err(BundleError::UnsupportedVersion(manifest.format_version));
        }

        let schema = TrainingSchema::new(manifest.train_columns)?;
        if let Some(pinned) = manifest.layout_hash {
            schema.validate_layout(LAYOUT_VERSION, pinned)?;
        }

        let model_path = dir.join(manifest.model.path());
        if !model_path.exists() {
            return Err(BundleError::ModelMissing(model_path));
        }

        let classifier: Box<dyn Classifier> = match &manifest.model {
            ModelSource::Onnx { .. } => {
                Box::new(OnnxClassifier::load(&model_path, Some(schema.len()))?)
            }
            ModelSource::TreeEnsemble { .. } => {
                Box::new(TreeEnsembleClassifier::load(&model_path)?)
            }
        };

        let mut bundle = Self::from_parts(manifest.name, schema, classifier, manifest.label_classes)?;
        bundle.metadata.path = model_path.display().to_string();
        Ok(bundle)
    }

    /// Assemble a bundle from already-built parts
    pub fn from_parts(
        name: impl Into<String>,
        schema: TrainingSchema,
        classifier: Box<dyn Classifier>,
        label_classes: Option<Vec<String>>,
    ) -> Result<Self, BundleError> {
        if let Some(width) = classifier.n_features() {
            if width != schema.len() {
                return Err(BundleError::WidthMismatch {
                    model: width,
                    columns: schema.len(),
                });
            }
        }

        let metadata = BundleMetadata {
            name: name.into(),
            path: "<memory>".to_string(),
            backend: classifier.name().to_string(),
            column_count: schema.len(),
            layout_hash: schema.hash(),
            loaded_at: Utc::now(),
        };

        log::info!(
            "Model bundle '{}' ready: {} backend, {} columns, layout {:08x}",
            metadata.name,
            metadata.backend,
            metadata.column_count,
            metadata.layout_hash
        );

        Ok(Self {
            schema,
            classifier,
            label_classes,
            metadata,
        })
    }

    pub fn schema(&self) -> &TrainingSchema {
        &self.schema
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn label_classes(&self) -> Option<&[String]> {
        self.label_classes.as_deref()
    }

    pub fn metadata(&self) -> &BundleMetadata {
        &self.metadata
    }
}

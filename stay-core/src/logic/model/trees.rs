//! Native Gradient-Boosted Trees
//!
//! Evaluates a tree ensemble exported to JSON, so a bundle can run without
//! ONNX Runtime. Scoring follows sklearn's `GradientBoostingClassifier`:
//! each class accumulates `init + learning_rate * sum(leaf values)`, a
//! split sends `x <= threshold` left, binary models use the sigmoid of a
//! single raw score and multi-class models a softmax.
//!
//! ```json
//! {
//!   "n_features": 3,
//!   "n_classes": 2,
//!   "learning_rate": 0.1,
//!   "init": [-0.4],
//!   "stages": [[{ "nodes": [
//!     { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!     { "value": -1.2 },
//!     { "value": 0.8 }
//!   ]}]]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::inference::{argmax, check_width, Classifier, ClassifierOutput, InferenceError};

// ============================================================================
// MODEL FORMAT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. Children always come after their
    /// parent (checked by [`TreeEnsemble::validate`]), so this terminates.
    pub fn evaluate(&self, features: &[f32]) -> f32 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub n_classes: usize,
    pub learning_rate: f32,
    /// Initial raw score per output
    pub init: Vec<f32>,
    /// One tree per output in every boosting stage
    pub stages: Vec<Vec<Tree>>,
}

impl TreeEnsemble {
    /// Raw score outputs: 1 for binary models, one per class otherwise
    pub fn n_outputs(&self) -> usize {
        if self.n_classes == 2 {
            1
        } else {
            self.n_classes
        }
    }

    pub fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |msg: String| Err(InferenceError::InvalidModel(msg));

        if self.n_classes < 2 {
            return invalid(format!("need at least 2 classes, got {}", self.n_classes));
        }
        if self.n_features == 0 {
            return invalid("n_features must be positive".to_string());
        }
        let outputs = self.n_outputs();
        if self.init.len() != outputs {
            return invalid(format!("expected {} init scores, got {}", outputs, self.init.len()));
        }

        for (s, stage) in self.stages.iter().enumerate() {
            if stage.len() != outputs {
                return invalid(format!("stage {} has {} trees, expected {}", s, stage.len(), outputs));
            }
            for (t, tree) in stage.iter().enumerate() {
                if tree.nodes.is_empty() {
                    return invalid(format!("stage {} tree {} is empty", s, t));
                }
                for (i, node) in tree.nodes.iter().enumerate() {
                    if let Node::Split {
                        feature,
                        left,
                        right,
                        ..
                    } = node
                    {
                        if *feature >= self.n_features {
                            return invalid(format!(
                                "stage {} tree {} node {} splits on feature {} of {}",
                                s, t, i, feature, self.n_features
                            ));
                        }
                        let n = tree.nodes.len();
                        if *left <= i || *right <= i || *left >= n || *right >= n {
                            return invalid(format!(
                                "stage {} tree {} node {} has bad children ({}, {})",
                                s, t, i, left, right
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Raw additive scores
    pub fn raw_scores(&self, features: &[f32]) -> Vec<f32> {
        let mut scores = self.init.clone();
        for stage in &self.stages {
            for (k, tree) in stage.iter().enumerate() {
                scores[k] += self.learning_rate * tree.evaluate(features);
            }
        }
        scores
    }

    /// Class probabilities
    pub fn predict_proba(&self, features: &[f32]) -> Vec<f32> {
        let raw = self.raw_scores(features);
        if self.n_classes == 2 {
            let p = sigmoid(raw[0]);
            vec![1.0 - p, p]
        } else {
            softmax(&raw)
        }
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn softmax(raw: &[f32]) -> Vec<f32> {
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = raw.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct TreeEnsembleClassifier {
    ensemble: TreeEnsemble,
}

impl TreeEnsembleClassifier {
    pub fn new(ensemble: TreeEnsemble) -> Result<Self, InferenceError> {
        ensemble.validate()?;
        Ok(Self { ensemble })
    }

    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        log::info!("Loading tree ensemble from: {}", path.display());

        let text = fs::read_to_string(path).map_err(|e| {
            InferenceError::InvalidModel(format!("cannot read {}: {}", path.display(), e))
        })?;
        let ensemble: TreeEnsemble = serde_json::from_str(&text).map_err(|e| {
            InferenceError::InvalidModel(format!("cannot parse {}: {}", path.display(), e))
        })?;

        log::info!(
            "Tree ensemble loaded: {} stages, {} classes, {} features",
            ensemble.stages.len(),
            ensemble.n_classes,
            ensemble.n_features
        );
        Self::new(ensemble)
    }

    pub fn ensemble(&self) -> &TreeEnsemble {
        &self.ensemble
    }
}

impl Classifier for TreeEnsembleClassifier {
    fn name(&self) -> &'static str {
        "tree_ensemble"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.ensemble.n_features)
    }

    fn predict(&self, features: &[f32]) -> Result<ClassifierOutput, InferenceError> {
        check_width(self.n_features(), features)?;

        let probabilities = self.ensemble.predict_proba(features);
        let class_index = argmax(&probabilities)
            .ok_or_else(|| InferenceError::Output("no class scores".to_string()))?;

        Ok(ClassifierOutput {
            class_index: class_index as i64,
            probabilities: Some(probabilities),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f32, left: f32, right: f32) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: left },
                Node::Leaf { value: right },
            ],
        }
    }

    fn binary() -> TreeEnsemble {
        TreeEnsemble {
            n_features: 2,
            n_classes: 2,
            learning_rate: 0.5,
            init: vec![0.0],
            stages: vec![vec![stump(0, 0.5, -2.0, 2.0)], vec![stump(1, 10.0, -1.0, 1.0)]],
        }
    }

    #[test]
    fn test_binary_prediction() {
        let classifier = TreeEnsembleClassifier::new(binary()).unwrap();

        let long = classifier.predict(&[1.0, 20.0]).unwrap();
        assert_eq!(long.class_index, 1);
        let p = long.probabilities.unwrap();
        assert!((p[1] - sigmoid(1.5)).abs() < 1e-6);

        let short = classifier.predict(&[0.0, 3.0]).unwrap();
        assert_eq!(short.class_index, 0);
    }

    #[test]
    fn test_split_goes_left_on_equal() {
        let tree = stump(0, 0.5, -2.0, 2.0);
        assert_eq!(tree.evaluate(&[0.5]), -2.0);
        assert_eq!(tree.evaluate(&[0.51]), 2.0);
    }

    #[test]
    fn test_multiclass_prediction() {
        let ensemble = TreeEnsemble {
            n_features: 1,
            n_classes: 3,
            learning_rate: 1.0,
            init: vec![0.0, 0.0, 0.0],
            stages: vec![vec![
                stump(0, 1.0, 3.0, 0.0),
                stump(0, 2.0, 0.0, 0.0),
                stump(0, 2.0, 0.0, 3.0),
            ]],
        };
        let classifier = TreeEnsembleClassifier::new(ensemble).unwrap();

        assert_eq!(classifier.predict(&[0.0]).unwrap().class_index, 0);
        assert_eq!(classifier.predict(&[5.0]).unwrap().class_index, 2);
        let p = classifier.predict(&[1.5]).unwrap().probabilities.unwrap();
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_width_mismatch() {
        let classifier = TreeEnsembleClassifier::new(binary()).unwrap();
        assert_eq!(
            classifier.predict(&[1.0]).unwrap_err(),
            InferenceError::WidthMismatch { expected: 2, actual: 1 }
        );
    }

    #[test]
    fn test_validation_rejects_bad_trees() {
        let mut bad_feature = binary();
        bad_feature.stages[0][0] = stump(5, 0.5, 0.0, 0.0);
        assert!(bad_feature.validate().is_err());

        let mut cycle = binary();
        cycle.stages[0][0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 0.5,
            left: 0,
            right: 2,
        };
        assert!(cycle.validate().is_err());

        let mut wrong_init = binary();
        wrong_init.init = vec![0.0, 0.0];
        assert!(wrong_init.validate().is_err());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "n_features": 1, "n_classes": 2, "learning_rate": 0.1, "init": [0.2],
            "stages": [[{"nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"value": -1.0}, {"value": 1.0}
            ]}]]
        }"#;
        let ensemble: TreeEnsemble = serde_json::from_str(json).unwrap();
        assert_eq!(ensemble.stages[0][0].nodes[1], Node::Leaf { value: -1.0 });
        assert!(ensemble.validate().is_ok());
    }
}

// File: src/core/model.rs
//! Regression models that turn a feature vector into a monthly price.
//!
//! The artifact produced by the training pipeline is a [`ModelArtifact`]: metadata
//! for the "about" view plus one [`PricingModel`]. Anything that implements
//! [`Predictor`] can stand in for it, which is how tests inject failing models.

use crate::error::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};

/// An opaque price model with a fixed input width.
pub trait Predictor: Send + Sync {
    /// Number of input columns the model was trained on.
    fn n_features(&self) -> usize;

    /// Raw model output for one row.
    fn predict_raw(&self, features: &[f64]) -> EstimatorResult<f64>;
}

/// Serialized model families the loader understands.
///
/// Externally tagged so the same artifact decodes from bincode and JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingModel {
    /// Additive regression trees, as exported from gradient boosting.
    GradientBoosted(TreeEnsemble),
    /// Ordinary least squares.
    Linear(LinearModel),
}

impl PricingModel {
    pub fn kind(&self) -> &'static str {
        match self {
            PricingModel::GradientBoosted(_) => "gradient_boosted",
            PricingModel::Linear(_) => "linear",
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> EstimatorResult<()> {
        match self {
            PricingModel::GradientBoosted(m) => m.validate(),
            PricingModel::Linear(m) => m.validate(),
        }
    }
}

impl Predictor for PricingModel {
    fn n_features(&self) -> usize {
        match self {
            PricingModel::GradientBoosted(m) => m.n_features,
            PricingModel::Linear(m) => m.weights.len(),
        }
    }

    fn predict_raw(&self, features: &[f64]) -> EstimatorResult<f64> {
        check_width(self.n_features(), features)?;
        let raw = match self {
            PricingModel::GradientBoosted(m) => m.score(features)?,
            PricingModel::Linear(m) => m.score(features),
        };
        if raw.is_finite() {
            Ok(raw)
        } else {
            Err(EstimatorError::prediction(format!(
                "model produced a non-finite value ({})",
                raw
            )))
        }
    }
}

fn check_width(expected: usize, features: &[f64]) -> EstimatorResult<()> {
    if features.len() != expected {
        return Err(EstimatorError::prediction(format!(
            "feature dimension mismatch: expected {}, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

/// A node in a flattened regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] < threshold`, otherwise to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// One tree stored as a node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    pub fn leaf(value: f64) -> Self {
        Self {
            nodes: vec![TreeNode::Leaf { value }],
        }
    }

    /// Walks from the root to a leaf.
    ///
    /// Unvalidated trees can reach here through [`crate::PriceEstimator::new`], so
    /// bad indices are errors and the walk is capped at one visit per node.
    fn score(&self, x: &[f64]) -> Result<f64, String> {
        let mut idx = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x
                        .get(*feature)
                        .ok_or_else(|| format!("node {} reads missing feature {}", idx, feature))?;
                    idx = if *value < *threshold { *left } else { *right };
                }
                None => return Err(format!("node index {} is out of bounds", idx)),
            }
        }
        Err(format!(
            "walk did not reach a leaf within {} steps",
            self.nodes.len()
        ))
    }

    /// Children must point forward so that every walk terminates.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} but the model has {} features",
                        i, feature, n_features
                    ));
                }
                if threshold.is_nan() {
                    return Err(format!("node {} has a NaN threshold", i));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child index {}", i, child));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Gradient-boosted regression trees: `base_score + Σ tree(x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    fn score(&self, x: &[f64]) -> EstimatorResult<f64> {
        let mut total = self.base_score;
        for (t, tree) in self.trees.iter().enumerate() {
            total += tree
                .score(x)
                .map_err(|e| EstimatorError::prediction(format!("tree {}: {}", t, e)))?;
        }
        Ok(total)
    }

    fn validate(&self) -> EstimatorResult<()> {
        if self.n_features == 0 {
            return Err(EstimatorError::predictor_unavailable(
                "tree ensemble declares zero features",
            ));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                EstimatorError::predictor_unavailable(format!("tree {}: {}", t, e))
            })?;
        }
        Ok(())
    }
}

/// `intercept + weights · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearModel {
    fn score(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(x)
                .map(|(w, v)| w * v)
                .sum::<f64>()
    }

    fn validate(&self) -> EstimatorResult<()> {
        if self.weights.is_empty() {
            return Err(EstimatorError::predictor_unavailable(
                "linear model has no weights",
            ));
        }
        if !self.intercept.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(EstimatorError::predictor_unavailable(
                "linear model has non-finite coefficients",
            ));
        }
        Ok(())
    }
}

/// Descriptive facts shown in the "about model" view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub region: String,
    pub train_r2: f64,
    pub test_r2: f64,
    pub description: String,
}

impl ModelMetadata {
    /// Train/test R² gap below ten points counts as a good fit.
    pub fn is_good_fit(&self) -> bool {
        (self.train_r2 - self.test_r2).abs() < 0.10
    }
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            name: "XGBoost".to_string(),
            region: "Kota Tangerang Selatan".to_string(),
            train_r2: 0.70,
            test_r2: 0.63,
            description: "Initial monthly rent estimate for a kost room. Not a final price."
                .to_string(),
        }
    }
}

/// What lives in the model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub model: PricingModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump_ensemble() -> TreeEnsemble {
        // x[0] < 10 → -100_000 else +150_000; x[1] < 0.5 → 0 else +250_000
        TreeEnsemble {
            n_features: 3,
            base_score: 900_000.0,
            trees: vec![
                RegressionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 0,
                            threshold: 10.0,
                            left: 1,
                            right: 2,
                        },
                        TreeNode::Leaf { value: -100_000.0 },
                        TreeNode::Leaf { value: 150_000.0 },
                    ],
                },
                RegressionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 1,
                            threshold: 0.5,
                            left: 1,
                            right: 2,
                        },
                        TreeNode::Leaf { value: 0.0 },
                        TreeNode::Leaf { value: 250_000.0 },
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_tree_ensemble_prediction() {
        let model = PricingModel::GradientBoosted(stump_ensemble());
        assert!(model.validate().is_ok());
        assert_eq!(model.n_features(), 3);
        assert_eq!(model.predict_raw(&[12.0, 1.0, 0.0]).unwrap(), 1_300_000.0);
        assert_eq!(model.predict_raw(&[4.0, 0.0, 1.0]).unwrap(), 800_000.0);
        // Threshold is exclusive on the left branch.
        assert_eq!(model.predict_raw(&[10.0, 0.0, 0.0]).unwrap(), 1_050_000.0);
    }

    #[test]
    fn test_empty_ensemble_returns_base_score() {
        let model = PricingModel::GradientBoosted(TreeEnsemble {
            n_features: 2,
            base_score: 500_000.0,
            trees: vec![],
        });
        assert_eq!(model.predict_raw(&[1.0, 2.0]).unwrap(), 500_000.0);
    }

    #[test]
    fn test_linear_prediction() {
        let model = PricingModel::Linear(LinearModel {
            intercept: 200_000.0,
            weights: vec![50_000.0, 300_000.0],
        });
        assert_eq!(model.kind(), "linear");
        assert_eq!(model.predict_raw(&[12.0, 1.0]).unwrap(), 1_100_000.0);
    }

    #[test]
    fn test_dimension_mismatch_is_prediction_failure() {
        let model = PricingModel::GradientBoosted(stump_ensemble());
        let err = model.predict_raw(&[12.0, 1.0]).unwrap_err();
        assert!(matches!(err, EstimatorError::PredictionFailure(_)));
        assert!(err.to_string().contains("expected 3, got 2"));
    }

    #[test]
    fn test_non_finite_output_is_prediction_failure() {
        let model = PricingModel::Linear(LinearModel {
            intercept: 0.0,
            weights: vec![1.0],
        });
        let err = model.predict_raw(&[f64::INFINITY]).unwrap_err();
        assert!(matches!(err, EstimatorError::PredictionFailure(_)));
    }

    #[test]
    fn test_validate_rejects_bad_trees() {
        let mut bad_feature = stump_ensemble();
        bad_feature.trees[0].nodes[0] = TreeNode::Split {
            feature: 7,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        let err = PricingModel::GradientBoosted(bad_feature).validate().unwrap_err();
        assert!(matches!(err, EstimatorError::PredictorUnavailable(_)));
        assert!(err.to_string().contains("feature 7"));

        let mut cycle = stump_ensemble();
        cycle.trees[1].nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 1.0,
            left: 0,
            right: 2,
        };
        assert!(PricingModel::GradientBoosted(cycle).validate().is_err());

        let mut empty_tree = stump_ensemble();
        empty_tree.trees.push(RegressionTree { nodes: vec![] });
        assert!(PricingModel::GradientBoosted(empty_tree).validate().is_err());

        let linear = PricingModel::Linear(LinearModel {
            intercept: f64::NAN,
            weights: vec![1.0],
        });
        assert!(linear.validate().is_err());
    }

    #[test]
    fn test_metadata_good_fit() {
        let meta = ModelMetadata::default();
        assert_eq!(meta.name, "XGBoost");
        assert!(meta.is_good_fit());

        let overfit = ModelMetadata {
            train_r2: 0.95,
            test_r2: 0.60,
            ..ModelMetadata::default()
        };
        assert!(!overfit.is_good_fit());
    }

    #[test]
    fn test_artifact_json_shape() {
        let artifact = ModelArtifact {
            metadata: ModelMetadata::default(),
            model: PricingModel::Linear(LinearModel {
                intercept: 1.0,
                weights: vec![2.0],
            }),
        };
        let json = serde_json::to_value(&artifact).unwrap();
        assert!(json["model"]["linear"]["weights"].is_array());
        assert_eq!(json["metadata"]["region"], "Kota Tangerang Selatan");
    }
}

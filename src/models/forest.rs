//! Decision-tree ensembles (random-forest style).
//!
//! Trees are stored as flat node arrays; node 0 is the root. A split sends
//! `x[feature] <= threshold` to `left`, everything else to `right`. The
//! ensemble output is the mean of the leaf values reached in every tree.

use serde::{Deserialize, Serialize};

use super::{check_input, Classifier, Estimator, ModelError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Malformed("empty tree".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(ModelError::Malformed(format!(
                            "node {i} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if left >= self.nodes.len() || right >= self.nodes.len() {
                        return Err(ModelError::Malformed(format!(
                            "node {i} points outside the tree"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::Malformed(format!("node {i} has a non-finite threshold")));
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::Malformed(format!("leaf {i} is not finite")));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. The walk is bounded by the node count so
    /// a cyclic tree fails instead of spinning.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0usize;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).ok_or_else(|| {
                        ModelError::Malformed(format!("feature {feature} out of range"))
                    })?;
                    idx = if *v <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::Malformed(format!("node {idx} does not exist"))),
            }
        }
        Err(ModelError::Malformed("tree walk did not reach a leaf".to_string()))
    }
}

/// Ordered feature list plus the trees voting over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub features: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("ensemble has no trees".to_string()));
        }
        self.trees
            .iter()
            .try_for_each(|t| t.validate(self.features.len()))
    }

    fn mean_leaf(&self, x: &[f64]) -> Result<f64, ModelError> {
        check_input(x, self.features.len())?;
        if self.trees.is_empty() {
            return Err(ModelError::Malformed("ensemble has no trees".to_string()));
        }
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(x)?;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / self.trees.len() as f64;
        if mean.is_finite() {
            Ok(mean)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

/// Regression forest used as an [`Estimator`].
#[derive(Debug, Clone)]
pub struct ForestRegressor(pub TreeEnsemble);

impl Estimator for ForestRegressor {
    fn features(&self) -> &[String] {
        &self.0.features
    }

    fn estimate(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.0.mean_leaf(x)
    }
}

/// Classification forest; leaves hold failure probabilities.
#[derive(Debug, Clone)]
pub struct ForestClassifier(pub TreeEnsemble);

impl Classifier for ForestClassifier {
    fn features(&self) -> &[String] {
        &self.0.features
    }

    fn failure_probability(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.0.mean_leaf(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: f64, high: f64) -> DecisionTree {
        DecisionTree {
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: low },
                TreeNode::Leaf { value: high },
            ],
        }
    }

    fn ensemble() -> TreeEnsemble {
        TreeEnsemble {
            features: vec!["brake_pad_thickness_mm".into()],
            trees: vec![stump(3.0, 5.0, 100.0), stump(5.0, 20.0, 80.0)],
        }
    }

    #[test]
    fn test_ensemble_mean() {
        let f = ForestRegressor(ensemble());
        assert!((f.estimate(&[2.0]).unwrap() - 12.5).abs() < 1e-9);
        assert!((f.estimate(&[4.0]).unwrap() - 60.0).abs() < 1e-9);
        assert!((f.estimate(&[9.0]).unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_goes_left() {
        let tree = stump(3.0, 1.0, 2.0);
        assert_eq!(tree.evaluate(&[3.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_cyclic_tree_fails() {
        let tree = DecisionTree {
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(matches!(tree.evaluate(&[1.0]), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_validate_rejects_out_of_range_feature() {
        let mut e = ensemble();
        e.trees[0].nodes[0] = TreeNode::Split {
            feature: 3,
            threshold: 1.0,
            left: 1,
            right: 2,
        };
        assert!(matches!(e.validate(), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_node_json_shape() {
        let node: TreeNode =
            serde_json::from_str(r#"{"node": "leaf", "value": 0.25}"#).unwrap();
        assert_eq!(node, TreeNode::Leaf { value: 0.25 });
    }
}

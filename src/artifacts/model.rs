//! Regression model exported from training. Output is log1p(price).

use serde::Deserialize;
use std::path::Path;

use super::{read_json, PriceModel};
use crate::error::{AppError, Result};
use crate::types::FeatureVector;

/// One node of a regression tree. Children are indices into the tree's
/// node list and always point forward, so traversal terminates.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Direction taken when the feature value is NaN.
        #[serde(default)]
        default_left: bool,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn leaf_value(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let v = x[*feature];
                    idx = if v.is_nan() {
                        if *default_left { *left } else { *right }
                    } else if v < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn check(&self, num_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } = node
            {
                if *feature >= num_features {
                    return Err(format!("node {i} splits on feature {feature} of {num_features}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {i} has a non-finite threshold"));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Gradient-boosted ensemble: `base_score + sum(tree leaves)`.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsemble {
    pub num_features: usize,
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceModelArtifact {
    Gbdt(TreeEnsemble),
    Linear(LinearModel),
}

impl PriceModelArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = read_json(path)?;
        model.check().map_err(|reason| AppError::ArtifactLoad {
            path: path.display().to_string(),
            reason,
        })?;
        Ok(model)
    }

    #[cfg(test)]
    pub fn from_json_str(data: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(data)?;
        model.check().map_err(|reason| AppError::ArtifactLoad {
            path: "<inline>".to_string(),
            reason,
        })?;
        Ok(model)
    }

    pub fn num_features(&self) -> usize {
        match self {
            PriceModelArtifact::Gbdt(e) => e.num_features,
            PriceModelArtifact::Linear(m) => m.weights.len(),
        }
    }

    fn check(&self) -> std::result::Result<(), String> {
        match self {
            PriceModelArtifact::Gbdt(e) => {
                if e.trees.is_empty() {
                    return Err("ensemble has no trees".to_string());
                }
                for (t, tree) in e.trees.iter().enumerate() {
                    tree.check(e.num_features).map_err(|r| format!("tree {t}: {r}"))?;
                }
                Ok(())
            }
            PriceModelArtifact::Linear(m) => {
                if m.weights.is_empty() {
                    return Err("linear model has no weights".to_string());
                }
                Ok(())
            }
        }
    }
}

impl PriceModel for PriceModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let expected = self.num_features();
        if features.len() != expected {
            return Err(AppError::Inference(format!(
                "feature length mismatch: got {}, expected {expected}",
                features.len()
            )));
        }
        let x = features.as_slice();
        let out = match self {
            PriceModelArtifact::Gbdt(e) => {
                e.base_score + e.trees.iter().map(|t| t.leaf_value(x)).sum::<f64>()
            }
            PriceModelArtifact::Linear(m) => {
                m.intercept + m.weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
            }
        };
        if !out.is_finite() {
            return Err(AppError::Inference(format!("model produced non-finite output {out}")));
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        match self {
            PriceModelArtifact::Gbdt(_) => "gbdt",
            PriceModelArtifact::Linear(_) => "linear",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUMPS: &str = r#"{
        "kind": "gbdt",
        "num_features": 2,
        "base_score": 10.0,
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 0.5, "left": 1, "right": 2, "default_left": true },
                { "leaf": -0.25 },
                { "leaf": 0.75 }
            ] },
            { "nodes": [
                { "feature": 1, "threshold": 3.0, "left": 1, "right": 2 },
                { "leaf": 0.1 },
                { "leaf": 0.2 }
            ] }
        ]
    }"#;

    #[test]
    fn ensemble_sums_leaves_over_base_score() {
        let m = PriceModelArtifact::from_json_str(STUMPS).unwrap();
        assert_eq!(m.name(), "gbdt");
        let low = m.predict(&FeatureVector(vec![0.0, 1.0])).unwrap();
        assert!((low - (10.0 - 0.25 + 0.1)).abs() < 1e-12);
        let high = m.predict(&FeatureVector(vec![1.0, 3.0])).unwrap();
        assert!((high - (10.0 + 0.75 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn nan_follows_default_direction() {
        let m = PriceModelArtifact::from_json_str(STUMPS).unwrap();
        let v = m.predict(&FeatureVector(vec![f64::NAN, f64::NAN])).unwrap();
        assert!((v - (10.0 - 0.25 + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn feature_length_mismatch_is_an_inference_error() {
        let m = PriceModelArtifact::from_json_str(STUMPS).unwrap();
        let err = m.predict(&FeatureVector(vec![1.0])).unwrap_err();
        assert!(matches!(err, AppError::Inference(_)));
    }

    #[test]
    fn linear_model_is_intercept_plus_dot() {
        let m = PriceModelArtifact::from_json_str(
            r#"{ "kind": "linear", "intercept": 9.0, "weights": [0.5, -1.0] }"#,
        )
        .unwrap();
        let v = m.predict(&FeatureVector(vec![2.0, 0.5])).unwrap();
        assert!((v - 9.5).abs() < 1e-12);
    }

    #[test]
    fn backward_child_is_rejected() {
        let json = r#"{
            "kind": "gbdt", "num_features": 1,
            "trees": [ { "nodes": [ { "feature": 0, "threshold": 1.0, "left": 0, "right": 1 }, { "leaf": 1.0 } ] } ]
        }"#;
        assert!(matches!(
            PriceModelArtifact::from_json_str(json),
            Err(AppError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn split_on_missing_feature_is_rejected() {
        let json = r#"{
            "kind": "gbdt", "num_features": 1,
            "trees": [ { "nodes": [ { "feature": 3, "threshold": 1.0, "left": 1, "right": 2 }, { "leaf": 1.0 }, { "leaf": 2.0 } ] } ]
        }"#;
        assert!(PriceModelArtifact::from_json_str(json).is_err());
    }
}

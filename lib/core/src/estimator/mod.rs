//! Regression estimators.
//!
//! Two estimator kinds share one training and prediction surface: an
//! ordinary-least-squares baseline and a bagged regression forest. The
//! trained form is a plain serializable enum so the artifact bundle can
//! carry either without trait objects.

pub mod forest;
pub mod linear;

pub use forest::{ForestModel, ForestParams};
pub use linear::LinearModel;

use crate::metrics::RegressionMetrics;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which estimator to train, with its hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EstimatorConfig {
    /// Ordinary least squares with intercept.
    Linear,
    /// Bagged CART regression trees.
    RandomForest(ForestParams),
}

impl EstimatorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            EstimatorConfig::Linear => "linear",
            EstimatorConfig::RandomForest(_) => "random_forest",
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig::RandomForest(ForestParams::default())
    }
}

/// A fitted estimator. Immutable once trained; `predict` is a pure
/// function of the fitted state and one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedEstimator {
    Linear(LinearModel),
    RandomForest(ForestModel),
}

impl TrainedEstimator {
    /// Train on feature vectors and targets. Fatal on empty input or
    /// ragged/mismatched dimensions; nothing is retried.
    pub fn fit(config: &EstimatorConfig, features: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        validate_training_input(features, targets)?;
        match config {
            EstimatorConfig::Linear => linear::fit(features, targets).map(Self::Linear),
            EstimatorConfig::RandomForest(params) => {
                forest::fit(params, features, targets).map(Self::RandomForest)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TrainedEstimator::Linear(_) => "linear",
            TrainedEstimator::RandomForest(_) => "random_forest",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            TrainedEstimator::Linear(m) => m.n_features(),
            TrainedEstimator::RandomForest(m) => m.n_features(),
        }
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        match self {
            TrainedEstimator::Linear(m) => m.predict_one(features),
            TrainedEstimator::RandomForest(m) => m.predict_one(features),
        }
    }

    /// Predict a batch row by row. Rows never see each other, so batch
    /// size cannot change any per-row result.
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>> {
        features.iter().map(|x| self.predict_one(x)).collect()
    }

    /// Score predictions against held-out targets.
    pub fn evaluate(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<RegressionMetrics> {
        let predictions = self.predict(features)?;
        RegressionMetrics::compute(&predictions, targets)
    }

    /// Normalized impurity-decrease importances; only the forest has them.
    pub fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            TrainedEstimator::Linear(_) => None,
            TrainedEstimator::RandomForest(m) => Some(m.feature_importances()),
        }
    }
}

fn validate_training_input(features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
    if features.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if targets.len() != features.len() {
        return Err(Error::InvalidDimension {
            expected: features.len(),
            actual: targets.len(),
        });
    }
    let dim = features[0].len();
    if dim == 0 {
        return Err(Error::Training("feature vectors are empty".to_string()));
    }
    for row in features {
        if row.len() != dim {
            return Err(Error::InvalidDimension {
                expected: dim,
                actual: row.len(),
            });
        }
    }
    Ok(())
}

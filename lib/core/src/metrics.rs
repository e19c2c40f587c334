//! Regression metrics computed on held-out data.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Standard regression-quality metrics.
///
/// Lower is better for mse/rmse/mae; higher is better for r2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// Compute all metrics for one prediction batch.
    ///
    /// r2 is reported as 0.0 when the targets have no variance, so a
    /// degenerate held-out slice never divides by zero.
    pub fn compute(predictions: &[f64], targets: &[f64]) -> Result<Self> {
        if predictions.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if predictions.len() != targets.len() {
            return Err(Error::InvalidDimension {
                expected: targets.len(),
                actual: predictions.len(),
            });
        }

        let n = predictions.len() as f64;
        let mse = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| {
                let diff = p - t;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let mae = predictions
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).abs())
            .sum::<f64>()
            / n;

        let target_mean = targets.iter().sum::<f64>() / n;
        let ss_tot = targets
            .iter()
            .map(|t| {
                let diff = t - target_mean;
                diff * diff
            })
            .sum::<f64>();
        let r2 = if ss_tot > 0.0 {
            1.0 - (mse * n) / ss_tot
        } else {
            0.0
        };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
        })
    }
}

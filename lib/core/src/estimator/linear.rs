//! Ordinary least squares baseline.

use crate::{Error, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// Constant feature columns would make the normal-equation matrix singular.
const RIDGE: f64 = 1e-9;

/// Fitted linear regression: one weight per feature plus an intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(Error::InvalidDimension {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// Solve the normal equations over the intercept-augmented design matrix.
///
/// Callers have already validated that `features` is non-empty and
/// rectangular and that `targets` matches its length.
pub(crate) fn fit(features: &[Vec<f64>], targets: &[f64]) -> Result<LinearModel> {
    let d = features[0].len();
    let dim = d + 1; // trailing intercept column

    let mut a = vec![vec![0.0f64; dim]; dim];
    let mut b = vec![0.0f64; dim];
    for (x, &y) in features.iter().zip(targets.iter()) {
        for i in 0..dim {
            let xi = if i < d { x[i] } else { 1.0 };
            b[i] += xi * y;
            for j in i..dim {
                let xj = if j < d { x[j] } else { 1.0 };
                a[i][j] += xi * xj;
            }
        }
    }
    for i in 0..dim {
        for j in 0..i {
            a[i][j] = a[j][i];
        }
    }
    for i in 0..d {
        a[i][i] += RIDGE;
    }

    let mut solution = solve(a, b)?;
    let intercept = solution.pop().ok_or_else(|| {
        Error::Training("normal equations produced no solution".to_string())
    })?;
    Ok(LinearModel {
        weights: solution,
        intercept,
    })
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by_key(|&row| OrderedFloat(a[row][col].abs()))
            .ok_or_else(|| Error::Training("empty system".to_string()))?;
        if a[pivot][col].abs() < 1e-12 {
            return Err(Error::Training("design matrix is singular".to_string()));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for c in col..n {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|c| a[row][c] * x[c]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

//! Deterministic train/test splitting.

use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices for a train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded rng and cut off a `test_fraction`
/// tail. The same `(n_rows, test_fraction, seed)` always yields the same
/// split, which keeps evaluation metrics reproducible across runs.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(Error::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    if n_rows < 2 {
        return Err(Error::DatasetTooSmall(n_rows));
    }

    let n_test = ((n_rows as f64 * test_fraction).round() as usize).clamp(1, n_rows - 1);

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test = indices.split_off(n_rows - n_test);
    Ok(Split {
        train: indices,
        test,
    })
}

//! Bagged regression forest.
//!
//! Each tree is grown on a bootstrap sample with CART-style greedy splits
//! chosen by sum-of-squared-error reduction. Prediction is the mean of the
//! per-tree outputs. Per-tree seeds derive from the base seed, so the
//! fitted forest does not depend on how rayon schedules the tree fits.

use crate::{Error, Result};
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Hyperparameters for the regression forest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 10,
            min_samples_split: 5,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(Error::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(Error::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
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

/// One fitted CART regression tree, nodes stored in an arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// Fitted regression forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestModel {
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
    n_features: usize,
    params: ForestParams,
}

impl ForestModel {
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Impurity-decrease importances, normalized to sum to 1 (all zeros
    /// when no tree found a useful split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.n_features {
            return Err(Error::InvalidDimension {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_one(features))
            .sum();
        Ok(sum / self.trees.len() as f64)
    }
}

/// Train a forest. Callers have already validated shape and length of the
/// training input.
pub(crate) fn fit(
    params: &ForestParams,
    features: &[Vec<f64>],
    targets: &[f64],
) -> Result<ForestModel> {
    params.validate()?;
    let n_rows = features.len();
    let n_features = features[0].len();

    let grown: Vec<(DecisionTree, Vec<f64>)> = (0..params.n_estimators)
        .into_par_iter()
        .map(|tree_index| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_index as u64));
            let sample: Vec<usize> = (0..n_rows).map(|_| rng.random_range(0..n_rows)).collect();
            grow_tree(params, features, targets, n_features, sample)
        })
        .collect();

    let mut importances = vec![0.0f64; n_features];
    let mut trees = Vec::with_capacity(grown.len());
    for (tree, tree_importances) in grown {
        for (total, gain) in importances.iter_mut().zip(tree_importances.iter()) {
            *total += gain;
        }
        trees.push(tree);
    }
    let total: f64 = importances.iter().sum();
    if total > 0.0 {
        for importance in &mut importances {
            *importance /= total;
        }
    }

    Ok(ForestModel {
        trees,
        importances,
        n_features,
        params: *params,
    })
}

fn grow_tree(
    params: &ForestParams,
    features: &[Vec<f64>],
    targets: &[f64],
    n_features: usize,
    sample: Vec<usize>,
) -> (DecisionTree, Vec<f64>) {
    let mut builder = TreeBuilder {
        params,
        features,
        targets,
        nodes: Vec::new(),
        importances: vec![0.0; n_features],
    };
    builder.grow(sample, 0);
    (
        DecisionTree {
            nodes: builder.nodes,
        },
        builder.importances,
    )
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct TreeBuilder<'a> {
    params: &'a ForestParams,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let n = rows.len() as f64;
        let sum: f64 = rows.iter().map(|&r| self.targets[r]).sum();
        let sum_sq: f64 = rows.iter().map(|&r| self.targets[r] * self.targets[r]).sum();
        let mean = sum / n;
        let sse = (sum_sq - sum * sum / n).max(0.0);

        if depth >= self.params.max_depth
            || rows.len() < self.params.min_samples_split
            || sse <= 1e-12
        {
            return self.push(Node::Leaf { value: mean });
        }

        let Some(split) = self.best_split(&rows, sse) else {
            return self.push(Node::Leaf { value: mean });
        };

        self.importances[split.feature] += split.gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.features[r][split.feature] <= split.threshold);

        // Reserve the split node's slot before growing children so child
        // indices are known when it is filled in.
        let id = self.push(Node::Leaf { value: mean });
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn best_split(&self, rows: &[usize], parent_sse: f64) -> Option<SplitCandidate> {
        let n = rows.len();
        let mut best: Option<SplitCandidate> = None;
        let mut order: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in 0..self.importances.len() {
            order.clear();
            order.extend(
                rows.iter()
                    .map(|&r| (self.features[r][feature], self.targets[r])),
            );
            order.sort_unstable_by_key(|&(x, _)| OrderedFloat(x));

            let total_sum: f64 = order.iter().map(|&(_, y)| y).sum();
            let total_sum_sq: f64 = order.iter().map(|&(_, y)| y * y).sum();

            let mut left_sum = 0.0;
            let mut left_sum_sq = 0.0;
            for i in 1..n {
                let (x_prev, y_prev) = order[i - 1];
                left_sum += y_prev;
                left_sum_sq += y_prev * y_prev;

                // Splits only exist between distinct feature values.
                if order[i].0 == x_prev {
                    continue;
                }

                let n_left = i as f64;
                let n_right = (n - i) as f64;
                let left_sse = (left_sum_sq - left_sum * left_sum / n_left).max(0.0);
                let right_sum = total_sum - left_sum;
                let right_sum_sq = total_sum_sq - left_sum_sq;
                let right_sse = (right_sum_sq - right_sum * right_sum / n_right).max(0.0);

                let gain = parent_sse - left_sse - right_sse;
                if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (x_prev + order[i].0) / 2.0,
                        gain,
                    });
                }
            }
        }
        best
    }
}

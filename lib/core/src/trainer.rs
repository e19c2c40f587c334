//! One-shot batch training.
//!
//! Control flow: labeled rows are split into feature records and targets,
//! the preprocessor is fit on the full batch, feature vectors are split
//! 80/20 with a fixed seed, the estimator is fit on the train portion and
//! scored on the held-out portion, and the result is packaged as a
//! [`ModelBundle`]. Any failure aborts the run; no partial bundle exists.

use crate::bundle::{FeatureImportance, ModelBundle, TrainingReport};
use crate::estimator::{EstimatorConfig, TrainedEstimator};
use crate::preprocess::Preprocessor;
use crate::record::Record;
use crate::schema::DatasetSchema;
use crate::split::train_test_split;
use crate::{Error, Result};
use chrono::Utc;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub estimator: EstimatorConfig,
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Train a model on labeled rows and return the finished bundle.
pub fn train(
    schema: &DatasetSchema,
    rows: &[Record],
    config: &TrainingConfig,
) -> Result<ModelBundle> {
    if rows.is_empty() {
        return Err(Error::EmptyDataset);
    }
    info!(
        rows = rows.len(),
        estimator = config.estimator.kind(),
        "starting training run"
    );

    let mut feature_rows = Vec::with_capacity(rows.len());
    let mut targets = Vec::with_capacity(rows.len());
    for row in rows {
        let (features, target) = schema.split_target(row.clone())?;
        feature_rows.push(features);
        targets.push(target);
    }

    if targets.iter().all(|&t| t == targets[0]) {
        return Err(Error::DegenerateTarget(schema.target_column().to_string()));
    }

    let (preprocessor, vectors) = Preprocessor::new(schema.clone()).fit_transform(&feature_rows)?;

    let split = train_test_split(rows.len(), config.test_fraction, config.seed)?;
    let gather = |indices: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = indices.iter().map(|&i| vectors[i].clone()).collect();
        let y = indices.iter().map(|&i| targets[i]).collect();
        (x, y)
    };
    let (train_x, train_y) = gather(&split.train);
    let (test_x, test_y) = gather(&split.test);

    let estimator = TrainedEstimator::fit(&config.estimator, &train_x, &train_y)?;
    let metrics = estimator.evaluate(&test_x, &test_y)?;
    info!(
        mse = metrics.mse,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        "evaluation on held-out split"
    );

    let feature_importances = estimator.feature_importances().map(|importances| {
        let mut ranked: Vec<FeatureImportance> = schema
            .feature_columns()
            .into_iter()
            .zip(importances.iter())
            .map(|(feature, &importance)| FeatureImportance {
                feature,
                importance,
            })
            .collect();
        ranked.sort_by_key(|f| std::cmp::Reverse(OrderedFloat(f.importance)));
        ranked
    });

    Ok(ModelBundle {
        id: Uuid::new_v4(),
        trained_at: Utc::now(),
        preprocessor,
        estimator,
        metrics,
        report: TrainingReport {
            estimator: config.estimator.kind().to_string(),
            train_size: train_x.len(),
            test_size: test_x.len(),
            feature_importances,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn schema() -> DatasetSchema {
        DatasetSchema::new(
            vec![
                Column::categorical("group"),
                Column::numeric("signal"),
                Column::numeric("noise"),
            ],
            "outcome",
        )
        .unwrap()
    }

    fn labeled_rows(n: usize) -> Vec<Record> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..n)
            .map(|i| {
                let signal = rng.random_range(0.0..10.0);
                let noise = rng.random_range(0.0..1.0);
                Record::new()
                    .with_field("group", if i % 2 == 0 { "a" } else { "b" })
                    .with_field("signal", signal)
                    .with_field("noise", noise)
                    .with_field("outcome", 5.0 * signal + noise)
            })
            .collect()
    }

    #[test]
    fn test_train_produces_complete_bundle() {
        let rows = labeled_rows(200);
        let bundle = train(&schema(), &rows, &TrainingConfig::default()).unwrap();

        assert_eq!(bundle.report.train_size, 160);
        assert_eq!(bundle.report.test_size, 40);
        assert_eq!(bundle.report.estimator, "random_forest");
        assert_eq!(bundle.feature_columns().len(), 3);
        assert_eq!(bundle.target_column(), "outcome");
        assert!(bundle.metrics.r2 > 0.7, "r2 = {}", bundle.metrics.r2);

        let importances = bundle.report.feature_importances.as_ref().unwrap();
        assert_eq!(importances[0].feature, "signal");
    }

    #[test]
    fn test_linear_bundle_has_no_importances() {
        let rows = labeled_rows(100);
        let config = TrainingConfig {
            estimator: EstimatorConfig::Linear,
            ..TrainingConfig::default()
        };
        let bundle = train(&schema(), &rows, &config).unwrap();
        assert_eq!(bundle.report.estimator, "linear");
        assert!(bundle.report.feature_importances.is_none());
    }

    #[test]
    fn test_metrics_reproducible_across_runs() {
        let rows = labeled_rows(100);
        let a = train(&schema(), &rows, &TrainingConfig::default()).unwrap();
        let b = train(&schema(), &rows, &TrainingConfig::default()).unwrap();
        assert_eq!(a.metrics, b.metrics);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_empty_dataset_is_fatal() {
        let result = train(&schema(), &[], &TrainingConfig::default());
        assert!(matches!(result, Err(Error::EmptyDataset)));
    }

    #[test]
    fn test_degenerate_target_is_fatal() {
        let rows: Vec<Record> = (0..20)
            .map(|i| {
                Record::new()
                    .with_field("group", "a")
                    .with_field("signal", i as f64)
                    .with_field("noise", 0.0)
                    .with_field("outcome", 1.0)
            })
            .collect();
        let result = train(&schema(), &rows, &TrainingConfig::default());
        assert!(matches!(result, Err(Error::DegenerateTarget(col)) if col == "outcome"));
    }

    #[test]
    fn test_row_missing_target_is_fatal() {
        let mut rows = labeled_rows(50);
        rows[10].remove("outcome");
        let result = train(&schema(), &rows, &TrainingConfig::default());
        assert!(matches!(result, Err(Error::MissingField(f)) if f == "outcome"));
    }
}

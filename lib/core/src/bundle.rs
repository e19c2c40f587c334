//! The durable model artifact.

use crate::estimator::TrainedEstimator;
use crate::metrics::RegressionMetrics;
use crate::preprocess::FittedPreprocessor;
use crate::schema::DatasetSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One feature's share of the forest's impurity decrease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Summary of a completed training run, carried alongside the fitted state
/// so the serving layer can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub estimator: String,
    pub train_size: usize,
    pub test_size: usize,
    /// Sorted descending; absent for the linear baseline.
    pub feature_importances: Option<Vec<FeatureImportance>>,
}

/// The unit of persistence and serving: fitted preprocessor state, trained
/// estimator, evaluation metrics and the training report.
///
/// A bundle is produced once by a training run and never mutated. At
/// serving time any number of concurrent requests read the same loaded
/// bundle through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub preprocessor: FittedPreprocessor,
    pub estimator: TrainedEstimator,
    pub metrics: RegressionMetrics,
    pub report: TrainingReport,
}

impl ModelBundle {
    pub fn schema(&self) -> &DatasetSchema {
        self.preprocessor.schema()
    }

    pub fn feature_columns(&self) -> Vec<String> {
        self.schema().feature_columns()
    }

    pub fn target_column(&self) -> &str {
        self.schema().target_column()
    }
}

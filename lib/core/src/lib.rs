//! # scorecast Core
//!
//! Core library for the scorecast prediction service.
//!
//! This crate provides the training-and-serving pipeline's data structures
//! and algorithms:
//!
//! - [`Record`] - One row of named attribute values
//! - [`DatasetSchema`] - Declared column set with per-record validation
//! - [`Preprocessor`] - Label vocabularies and z-score scaling, frozen at fit time
//! - [`TrainedEstimator`] - OLS baseline or bagged regression forest
//! - [`ModelBundle`] - The durable, versioned training artifact
//! - [`Predictor`] - Inference over a loaded bundle
//!
//! ## Example
//!
//! ```rust
//! use scorecast_core::{DatasetSchema, Predictor, SyntheticDataset, TrainingConfig};
//!
//! // Train on a synthetic batch.
//! let schema = DatasetSchema::student_performance();
//! let rows = SyntheticDataset::new(200).generate();
//! let bundle = scorecast_core::train(&schema, &rows, &TrainingConfig::default()).unwrap();
//!
//! // Score one record with the target stripped off.
//! let predictor = Predictor::new(bundle);
//! let (features, _actual) = schema.split_target(rows[0].clone()).unwrap();
//! let prediction = predictor.predict_one(&features).unwrap();
//! assert!(prediction.is_finite());
//! ```

pub mod bundle;
pub mod error;
pub mod estimator;
pub mod metrics;
pub mod predictor;
pub mod preprocess;
pub mod record;
pub mod schema;
pub mod split;
pub mod synthetic;
pub mod trainer;

pub use bundle::{FeatureImportance, ModelBundle, TrainingReport};
pub use error::{Error, Result};
pub use estimator::{
    EstimatorConfig, ForestModel, ForestParams, LinearModel, TrainedEstimator,
};
pub use metrics::RegressionMetrics;
pub use predictor::Predictor;
pub use preprocess::{FittedPreprocessor, NumericStats, Preprocessor, Vocabulary};
pub use record::{Record, Value};
pub use schema::{Column, ColumnKind, DatasetSchema};
pub use split::{train_test_split, Split};
pub use synthetic::SyntheticDataset;
pub use trainer::{train, TrainingConfig};

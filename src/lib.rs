//! # scorecast
//!
//! A student performance prediction service: schema-validated tabular
//! preprocessing, regression estimators, atomic model artifacts and a REST
//! serving layer around an immutable loaded bundle.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! scorecast train                 # synthesize data, train, save the bundle
//! scorecast serve --port 8080     # serve predictions over HTTP
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use scorecast::prelude::*;
//!
//! // Train on a synthetic batch and score one record.
//! let schema = DatasetSchema::student_performance();
//! let rows = SyntheticDataset::new(500).generate();
//! let bundle = train(&schema, &rows, &TrainingConfig::default()).unwrap();
//!
//! let predictor = Predictor::new(bundle);
//! let (record, actual) = schema.split_target(rows[0].clone()).unwrap();
//! let predicted = predictor.predict_one(&record).unwrap();
//! println!("predicted {:.1}, actual {:.1}", predicted, actual);
//! ```
//!
//! ## Crate Structure
//!
//! scorecast is composed of several crates:
//!
//! - [`scorecast-core`](https://docs.rs/scorecast-core) - Records, schema, preprocessing, estimators, metrics
//! - [`scorecast-storage`](https://docs.rs/scorecast-storage) - Atomic artifact persistence
//! - [`scorecast-api`](https://docs.rs/scorecast-api) - REST serving layer

// Re-export core types
pub use scorecast_core::{
    train, Column, ColumnKind, DatasetSchema, EstimatorConfig, Error, FeatureImportance,
    ForestParams, ModelBundle, Predictor, Preprocessor, Record, RegressionMetrics, Result,
    SyntheticDataset, TrainedEstimator, TrainingConfig, Value,
};

// Re-export storage
pub use scorecast_storage::{ArtifactError, ArtifactStore};

// Re-export API
pub use scorecast_api::{RestApi, ServiceContext, StudentRecord};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        train, ArtifactStore, Column, ColumnKind, DatasetSchema, Error, EstimatorConfig,
        ModelBundle, Predictor, Record, RegressionMetrics, Result, RestApi, ServiceContext,
        SyntheticDataset, TrainingConfig, Value,
    };
}

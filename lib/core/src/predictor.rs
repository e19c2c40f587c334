//! Inference wrapper around a loaded model bundle.

use crate::bundle::ModelBundle;
use crate::record::Record;
use crate::{Error, Result};
use std::sync::Arc;

/// Applies the frozen preprocessor and estimator of one [`ModelBundle`] to
/// incoming records. Cheap to clone; clones share the bundle.
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: Arc<ModelBundle>,
}

impl Predictor {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            bundle: Arc::new(bundle),
        }
    }

    pub fn from_arc(bundle: Arc<ModelBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Validate, transform and score one record.
    pub fn predict_one(&self, record: &Record) -> Result<f64> {
        let features = self.bundle.preprocessor.transform_one(record)?;
        self.bundle.estimator.predict_one(&features)
    }

    /// Predict a batch atomically: one invalid record fails the whole
    /// batch, with the offending index attached to the error.
    pub fn predict_many(&self, records: &[Record]) -> Result<Vec<f64>> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                self.predict_one(record).map_err(|source| Error::BatchRecord {
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }
}

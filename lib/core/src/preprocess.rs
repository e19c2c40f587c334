//! Record preprocessing: label vocabularies and z-score scaling.
//!
//! [`Preprocessor::fit`] learns one [`Vocabulary`] per categorical column
//! and one [`NumericStats`] per numeric column from a training batch. The
//! resulting [`FittedPreprocessor`] maps records to fixed-width feature
//! vectors and is frozen: vocabularies and statistics are never refit at
//! inference time, and a label that was not seen during fit is an error.

use crate::record::Record;
use crate::schema::DatasetSchema;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fit-time mapping from categorical label to integer code.
///
/// Labels are stored sorted, so a label's code is its sorted position and
/// lookup is a binary search. Sorting makes the encoding deterministic
/// regardless of row order in the fit batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    fn fit<'a>(labels: impl Iterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = labels.collect();
        Self {
            labels: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn code(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    pub fn label(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Fit-time scaling statistics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub mean: f64,
    pub std: f64,
}

impl NumericStats {
    fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }

    /// `(x - mean) / std`, with a zero-variance column mapping to exactly
    /// 0.0 for any input instead of dividing by zero.
    pub fn scale(&self, x: f64) -> f64 {
        if self.std == 0.0 {
            0.0
        } else {
            (x - self.mean) / self.std
        }
    }
}

/// Unfitted preprocessor for a declared schema.
pub struct Preprocessor {
    schema: DatasetSchema,
}

impl Preprocessor {
    pub fn new(schema: DatasetSchema) -> Self {
        Self { schema }
    }

    /// Build vocabularies and scaling statistics from a non-empty batch of
    /// feature records. Every record must carry exactly the declared
    /// columns with the declared types.
    pub fn fit(&self, rows: &[Record]) -> Result<FittedPreprocessor> {
        if rows.is_empty() {
            return Err(Error::EmptyDataset);
        }
        for row in rows {
            self.schema.validate(row)?;
        }

        let vocabularies = self
            .schema
            .categorical_columns()
            .map(|name| {
                Vocabulary::fit(rows.iter().map(|row| {
                    row.get(name)
                        .and_then(|v| v.as_label())
                        .expect("validated above")
                }))
            })
            .collect();

        let stats = self
            .schema
            .numeric_columns()
            .map(|name| {
                let values: Vec<f64> = rows
                    .iter()
                    .map(|row| {
                        row.get(name)
                            .and_then(|v| v.as_number())
                            .expect("validated above")
                    })
                    .collect();
                NumericStats::fit(&values)
            })
            .collect();

        Ok(FittedPreprocessor {
            schema: self.schema.clone(),
            vocabularies,
            stats,
        })
    }

    /// Fit on `rows`, then transform the same rows.
    pub fn fit_transform(&self, rows: &[Record]) -> Result<(FittedPreprocessor, Vec<Vec<f64>>)> {
        let fitted = self.fit(rows)?;
        let vectors = fitted.transform(rows)?;
        Ok((fitted, vectors))
    }
}

/// Fitted preprocessor state, frozen after fit and carried inside the
/// model bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    schema: DatasetSchema,
    vocabularies: Vec<Vocabulary>,
    stats: Vec<NumericStats>,
}

impl FittedPreprocessor {
    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    pub fn n_features(&self) -> usize {
        self.vocabularies.len() + self.stats.len()
    }

    pub fn vocabulary(&self, column: &str) -> Option<&Vocabulary> {
        self.schema
            .categorical_columns()
            .position(|name| name == column)
            .map(|i| &self.vocabularies[i])
    }

    pub fn numeric_stats(&self, column: &str) -> Option<&NumericStats> {
        self.schema
            .numeric_columns()
            .position(|name| name == column)
            .map(|i| &self.stats[i])
    }

    /// Encode one record as a feature vector: categorical codes in declared
    /// order, then scaled numerics in declared order.
    pub fn transform_one(&self, record: &Record) -> Result<Vec<f64>> {
        self.schema.validate(record)?;

        let mut out = Vec::with_capacity(self.n_features());
        for (vocab, name) in self.vocabularies.iter().zip(self.schema.categorical_columns()) {
            let label = record
                .get(name)
                .and_then(|v| v.as_label())
                .expect("validated above");
            let code = vocab.code(label).ok_or_else(|| Error::UnknownCategory {
                column: name.to_string(),
                label: label.to_string(),
            })?;
            out.push(code as f64);
        }
        for (stats, name) in self.stats.iter().zip(self.schema.numeric_columns()) {
            let x = record
                .get(name)
                .and_then(|v| v.as_number())
                .expect("validated above");
            out.push(stats.scale(x));
        }
        Ok(out)
    }

    pub fn transform(&self, rows: &[Record]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_one(row)).collect()
    }
}

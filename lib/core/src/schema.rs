//! Dataset schema definitions.
//!
//! A [`DatasetSchema`] declares the fixed column set a model is trained on:
//! which columns are categorical, which are numeric, and which single column
//! is the regression target. Every record used for training or inference is
//! validated against the schema; missing fields, extra fields and wrong
//! types are rejected rather than defaulted.

use crate::record::{Record, Value};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Kind of a feature column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Bounded label set, encoded through a fit-time vocabulary.
    Categorical,
    /// Numeric quantity, scaled with fit-time mean/std.
    Numeric,
}

/// A declared feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn categorical(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Categorical,
        }
    }

    pub fn numeric(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: ColumnKind::Numeric,
        }
    }
}

/// Declared column set for one dataset: ordered feature columns plus the
/// target column. Column order is fixed at declaration time and determines
/// feature vector layout (categoricals first, then numerics, each in
/// declared order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    columns: Vec<Column>,
    target: String,
}

impl DatasetSchema {
    pub fn new(columns: Vec<Column>, target: &str) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::InvalidConfig("schema has no columns".to_string()));
        }
        for (i, col) in columns.iter().enumerate() {
            if col.name == target {
                return Err(Error::InvalidConfig(format!(
                    "target column {} also declared as a feature",
                    target
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate column: {}",
                    col.name
                )));
            }
        }
        Ok(Self {
            columns,
            target: target.to_string(),
        })
    }

    /// The student-performance schema served by the default deployment:
    /// 14 feature columns and the `final_score` target.
    pub fn student_performance() -> Self {
        Self::new(
            vec![
                Column::numeric("age"),
                Column::categorical("gender"),
                Column::categorical("parental_education"),
                Column::numeric("household_income"),
                Column::numeric("previous_gpa"),
                Column::numeric("study_hours_per_week"),
                Column::numeric("attendance_rate"),
                Column::numeric("sleep_hours"),
                Column::numeric("exercise_hours_per_week"),
                Column::numeric("has_internet"),
                Column::numeric("has_computer"),
                Column::numeric("extracurricular_hours"),
                Column::categorical("school_type"),
                Column::numeric("class_size"),
            ],
            "final_score",
        )
        .expect("static schema is valid")
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn target_column(&self) -> &str {
        &self.target
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Categorical)
            .map(|c| c.name.as_str())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Numeric)
            .map(|c| c.name.as_str())
    }

    /// Feature names in feature-vector order: categorical columns in
    /// declared order, then numeric columns in declared order.
    pub fn feature_columns(&self) -> Vec<String> {
        self.categorical_columns()
            .chain(self.numeric_columns())
            .map(str::to_string)
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// Validate that a record carries exactly the declared feature columns
    /// with the declared types. The target column is not allowed here; use
    /// [`DatasetSchema::split_target`] for labeled training rows.
    pub fn validate(&self, record: &Record) -> Result<()> {
        for col in &self.columns {
            let value = record
                .get(&col.name)
                .ok_or_else(|| Error::MissingField(col.name.clone()))?;
            match (col.kind, value) {
                (ColumnKind::Numeric, Value::Number(_)) => {}
                (ColumnKind::Categorical, Value::Label(_)) => {}
                (ColumnKind::Numeric, other) => {
                    return Err(Error::WrongType {
                        field: col.name.clone(),
                        expected: "number",
                        actual: other.kind(),
                    });
                }
                (ColumnKind::Categorical, other) => {
                    return Err(Error::WrongType {
                        field: col.name.clone(),
                        expected: "label",
                        actual: other.kind(),
                    });
                }
            }
        }
        if record.len() != self.columns.len() {
            for name in record.field_names() {
                if !self.columns.iter().any(|c| c.name == name) {
                    return Err(Error::UnexpectedField(name.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Split a labeled training row into its feature record and target
    /// value. The target must be present and numeric; the remaining fields
    /// must validate as a feature record.
    pub fn split_target(&self, mut record: Record) -> Result<(Record, f64)> {
        let target = match record.remove(&self.target) {
            Some(Value::Number(n)) => n,
            Some(other) => {
                return Err(Error::WrongType {
                    field: self.target.clone(),
                    expected: "number",
                    actual: other.kind(),
                });
            }
            None => return Err(Error::MissingField(self.target.clone())),
        };
        self.validate(&record)?;
        Ok((record, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schema() -> DatasetSchema {
        DatasetSchema::new(
            vec![
                Column::categorical("color"),
                Column::numeric("size"),
            ],
            "price",
        )
        .unwrap()
    }

    fn valid_record() -> Record {
        Record::new().with_field("color", "red").with_field("size", 2.0)
    }

    #[test]
    fn test_schema_rejects_duplicate_columns() {
        let result = DatasetSchema::new(
            vec![Column::numeric("size"), Column::numeric("size")],
            "price",
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_schema_rejects_target_as_feature() {
        let result =
            DatasetSchema::new(vec![Column::numeric("price")], "price");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_accepts_exact_record() {
        assert!(small_schema().validate(&valid_record()).is_ok());
    }

    #[test]
    fn test_validate_missing_field() {
        let record = Record::new().with_field("color", "red");
        assert!(matches!(
            small_schema().validate(&record),
            Err(Error::MissingField(f)) if f == "size"
        ));
    }

    #[test]
    fn test_validate_extra_field() {
        let record = valid_record().with_field("weight", 1.0);
        assert!(matches!(
            small_schema().validate(&record),
            Err(Error::UnexpectedField(f)) if f == "weight"
        ));
    }

    #[test]
    fn test_validate_wrong_type() {
        let record = Record::new()
            .with_field("color", 3.0)
            .with_field("size", 2.0);
        assert!(matches!(
            small_schema().validate(&record),
            Err(Error::WrongType { field, .. }) if field == "color"
        ));
    }

    #[test]
    fn test_split_target() {
        let row = valid_record().with_field("price", 9.5);
        let (features, target) = small_schema().split_target(row).unwrap();
        assert_eq!(target, 9.5);
        assert!(!features.contains("price"));
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn test_split_target_missing() {
        let result = small_schema().split_target(valid_record());
        assert!(matches!(result, Err(Error::MissingField(f)) if f == "price"));
    }

    #[test]
    fn test_feature_column_order() {
        let schema = DatasetSchema::student_performance();
        let features = schema.feature_columns();
        assert_eq!(features.len(), 14);
        // Categoricals lead in declared order, numerics follow.
        assert_eq!(features[0], "gender");
        assert_eq!(features[1], "parental_education");
        assert_eq!(features[2], "school_type");
        assert_eq!(features[3], "age");
        assert_eq!(features[13], "class_size");
        assert_eq!(schema.target_column(), "final_score");
    }
}

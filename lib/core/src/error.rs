use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Field {field} expects a {expected} value, got {actual}")]
    WrongType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Unknown category for column {column}: {label:?}")]
    UnknownCategory { column: String, label: String },

    #[error("Record {index} in batch: {source}")]
    BatchRecord {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid feature vector length: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Dataset too small to split: {0} rows")]
    DatasetTooSmall(usize),

    #[error("Target column {0} has no variance")]
    DegenerateTarget(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether this error was caused by the caller's input rather than the
    /// training run or the service itself. Schema errors map to client-side
    /// HTTP statuses at the transport boundary and are never retried.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Error::MissingField(_)
            | Error::UnexpectedField(_)
            | Error::WrongType { .. }
            | Error::UnknownCategory { .. } => true,
            Error::BatchRecord { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

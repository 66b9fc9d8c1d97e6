//! Error types for dataset loading and the feature codec.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Column not found in dataset header: {0}")]
    MissingColumn(String),

    #[error("Dataset has no usable rows after cleaning")]
    EmptyDataset,

    #[error("Cannot fit codec: {0}")]
    Fit(String),

    #[error("Feature vector has length {actual}, codec expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

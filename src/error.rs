//! Error taxonomy for the scoring pipeline

use thiserror::Error;

/// Failures surfaced by the pipeline. All are fail-fast: the pipeline
/// either emits a complete, fully-scored table or nothing at all.
#[derive(Error, Debug)]
pub enum RfmError {
    #[error("no input records supplied")]
    EmptyInput,

    #[error("unparseable date value '{value}'")]
    MalformedDate { value: String },

    #[error("required column '{column}' is missing from the input table")]
    MissingColumn { column: String },

    #[error("missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("cannot form {needed} quintile buckets from {got} entities")]
    InsufficientData { needed: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),

    #[error("plot rendering failed: {0}")]
    Plot(String),
}

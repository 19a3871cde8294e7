//! Error types for cantus-series.

use thiserror::Error;

/// Construction-time errors for series combinators.
///
/// Reading past the end of a series is never an error; these are raised
/// eagerly when a series is built from a configuration that cannot work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Random pick needs at least one value")]
    EmptyPool,

    #[error("Invalid step: {0}. Must be positive")]
    InvalidStep(String),

    #[error("Series cannot be restarted, so it cannot be repeated")]
    NotRestartable,

    #[error("Record series needs at least one field")]
    EmptyRecord,

    #[error("Duplicate record field: {0}")]
    DuplicateField(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, SeriesError>;

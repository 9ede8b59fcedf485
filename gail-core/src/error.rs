//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum GailError {
    /// Malformed settings, detected at construction.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A column of a buffer does not have the expected number of elements.
    #[error("Shape mismatch in {name}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the column or tensor.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// A column expected by a consumer is missing in a buffer.
    #[error("Missing column in buffer: {0}")]
    MissingColumn(String),

    /// Demonstration file could not be used.
    #[error("Demonstration error: {0}")]
    Demo(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),
}

impl GailError {
    /// Constructs [`GailError::ShapeMismatch`].
    pub fn shape_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }
}

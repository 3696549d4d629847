use std::io;

use thiserror::Error;

use crate::types::ColumnName;

/// Error type for assignment parameters, input validation, and table IO.
#[derive(Debug, Error)]
pub enum TreatmentError {
    /// Bad argument or unknown column.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Two rows share an identifier.
    #[error("values in identifier column '{column}' are not unique (duplicate '{value}')")]
    DuplicateIdentifier {
        /// Identifier column, or `index` for positional ids.
        column: ColumnName,
        /// Canonical rendering of the repeated identifier.
        value: String,
    },
    /// Inconsistent weighting options.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Reading input or writing output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Input was not a JSON array or JSON Lines of objects.
    #[error("failed to parse subject table: {0}")]
    Parse(String),
}

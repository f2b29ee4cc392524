//! Error types for data quality checks

use thiserror::Error;

use crate::model::CellType;

/// Broad category of a [`QaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A precondition on the arguments was violated
    InvalidArgument,
    /// A column or row label does not exist in a table
    Lookup,
    /// The values involved do not support the requested arithmetic
    Type,
}

/// Errors raised by comparisons and table construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QaError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Row '{0}' not found")]
    RowNotFound(String),

    #[error("Unsupported operand types for {op}: {left} and {right}")]
    UnsupportedOperands {
        op: &'static str,
        left: CellType,
        right: CellType,
    },

    #[error("Integer overflow while computing {op}")]
    IntegerOverflow { op: &'static str },

    #[error("Column '{column}' holds a {found} value where a geometry is expected")]
    NotGeometry { column: String, found: CellType },
}

impl QaError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QaError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            QaError::ColumnNotFound(_) | QaError::RowNotFound(_) => ErrorKind::Lookup,
            QaError::UnsupportedOperands { .. }
            | QaError::IntegerOverflow { .. }
            | QaError::NotGeometry { .. } => ErrorKind::Type,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QaError::InvalidArgument(msg.into())
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, QaError>;

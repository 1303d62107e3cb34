//! Error types for hrql question handling.

use thiserror::Error;

/// Result type alias using [`HrqlError`].
pub type Result<T> = std::result::Result<T, HrqlError>;

/// Error types for hrql operations.
#[derive(Debug, Error)]
pub enum HrqlError {
    // ==================== Question Errors ====================
    /// No stage of the rule cascade recognized a column or operation.
    #[error("Could not interpret the question. Known columns: {}. Try: {}", known_columns.join(", "), examples.join("; "))]
    UnresolvedQuery {
        known_columns: Vec<String>,
        examples: Vec<String>,
    },

    /// A condition or aggregation referenced a column that could not be resolved.
    #[error("Unknown column '{column}'. Known columns: {}", known_columns.join(", "))]
    UnknownColumn {
        column: String,
        known_columns: Vec<String>,
    },

    /// Aggregation over a column with no numeric values in scope.
    #[error("Cannot compute {function} of '{column}': no numeric values in scope")]
    NonNumericAggregation { function: String, column: String },

    /// Follow-up requested without any prior context to expand.
    #[error("Cannot provide more details: {0}")]
    UnresolvedFollowUp(String),

    /// Query descriptor violates its shape invariant.
    #[error("Invalid query descriptor: {0}")]
    InvalidDescriptor(String),

    // ==================== Data Errors ====================
    /// Schema-related errors (duplicate column, missing identifier, etc.).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// CSV import error.
    #[error("Import error: {0}")]
    ImportError(String),

    /// Configuration validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// General execution errors.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Session lookup failure.
    #[error("Session not found: {0}")]
    SessionNotFound(uuid::Uuid),
}

/// Coarse classification of an error, reported alongside failed turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    UnresolvedQuery,
    UnknownColumn,
    NonNumericAggregation,
    UnresolvedFollowUp,
    Internal,
}

impl HrqlError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            HrqlError::UnresolvedQuery { .. } => ErrorKind::UnresolvedQuery,
            HrqlError::UnknownColumn { .. } => ErrorKind::UnknownColumn,
            HrqlError::NonNumericAggregation { .. } => ErrorKind::NonNumericAggregation,
            HrqlError::UnresolvedFollowUp(_) => ErrorKind::UnresolvedFollowUp,
            _ => ErrorKind::Internal,
        }
    }

    /// Builds an unknown-column error listing the given known columns.
    #[must_use]
    pub fn unknown_column<'a>(
        column: impl Into<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        HrqlError::UnknownColumn {
            column: column.into(),
            known_columns: known.into_iter().map(str::to_string).collect(),
        }
    }
}

use thiserror::Error;

/// Errors raised by the table layer before any aggregation output is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// A requested column is not part of the table.
    #[error("column '{name}' is not in the table. Choose from the following: {available:?}")]
    MissingColumn {
        name: String,
        available: Vec<String>,
    },

    /// A numeric parameter is outside its accepted range.
    #[error("'{name}' ({value}) should be {expected}")]
    InvalidArgument {
        name: String,
        value: String,
        expected: String,
    },

    /// Two columns would end up with the same name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Columns of a table must all have the same number of rows.
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A sample label pattern failed to compile or has no capture group.
    #[error("invalid sample label pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

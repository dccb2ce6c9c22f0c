//! Error types for user-query.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The input does not match the grammar for the field's declared type.
    /// Recovered at field granularity: the schema reports it to the errors
    /// sink and omits the field from the generated predicate.
    #[error("{0}")]
    Syntax(String),
}

impl QueryError {
    /// Create a syntax error with the given message.
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }
}

/// Result type alias for user-query operations.
pub type QueryResult<T> = Result<T, QueryError>;

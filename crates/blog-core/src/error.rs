//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business rule failures.
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more field rules failed; messages are joined by
    /// [`crate::domain::validate::MESSAGE_SEPARATOR`].
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The record was rejected before reaching the store.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl RepoError {
    /// The error reported when a post slug is already taken on a publish date.
    pub fn slug_taken(slug: &str, date: chrono::NaiveDate) -> Self {
        RepoError::Constraint(crate::domain::slug::slug_taken_message(slug, date))
    }
}

impl From<DomainError> for RepoError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => RepoError::Validation(msg),
        }
    }
}

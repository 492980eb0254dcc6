//! Query error types.

use collaborators::CollaboratorError;
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur while answering a read query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query is well formed but there is nothing to rank.
    #[error("No data: {0}")]
    NoData(&'static str),

    /// Query parameters are out of range.
    #[error("Invalid query: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

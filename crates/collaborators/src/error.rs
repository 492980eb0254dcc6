//! Collaborator error types.

use thiserror::Error;

/// Errors that can occur when calling a collaborator.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The bearer token is missing, malformed or unknown.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A notification could not be delivered.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    /// The collaborator could not be reached.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for collaborator results.
pub type Result<T> = std::result::Result<T, CollaboratorError>;

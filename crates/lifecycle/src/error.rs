//! Lifecycle error types.

use collaborators::CollaboratorError;
use common::{FeedbackId, OrderId};
use domain::{FeedbackError, OrderError};
use order_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Stable classification of a [`DomainError`], shared with the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    InvalidState,
    Upload,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Upload => "upload",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A command was rejected by the order aggregate.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A feedback update was rejected.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Feedback not found: {0}")]
    FeedbackNotFound(FeedbackId),

    /// The caller's role or identity does not permit the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Another writer changed the order between read and write.
    #[error("Order {0} was modified concurrently")]
    Conflict(OrderId),

    /// The image store did not return a URL.
    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl DomainError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        DomainError::Forbidden(reason.into())
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Order(e) if e.is_forbidden() => ErrorKind::Forbidden,
            DomainError::Order(e) if e.is_invalid_state() => ErrorKind::InvalidState,
            DomainError::Order(_) | DomainError::Feedback(_) => ErrorKind::Validation,
            DomainError::OrderNotFound(_) | DomainError::FeedbackNotFound(_) => {
                ErrorKind::NotFound
            }
            DomainError::Forbidden(_) => ErrorKind::Forbidden,
            DomainError::Conflict(_) => ErrorKind::InvalidState,
            DomainError::Upload(_) => ErrorKind::Upload,
            DomainError::Store(_) | DomainError::Collaborator(_) => ErrorKind::Internal,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConcurrencyConflict { order_id, .. } => DomainError::Conflict(order_id),
            StoreError::OrderNotFound(order_id) => DomainError::OrderNotFound(order_id),
            other => DomainError::Store(other),
        }
    }
}

/// Convenience type alias for lifecycle results.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;
    use common::Version;
    use domain::OrderStatus;

    #[test]
    fn order_errors_are_classified() {
        let err: DomainError = OrderError::NotOwner.into();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err: DomainError = OrderError::InvalidStateTransition {
            current_status: OrderStatus::Recycled,
            action: "cancel",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err: DomainError = OrderError::InvalidContactNumber.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn conflicts_report_invalid_state() {
        let order_id = OrderId::new();
        let err: DomainError = StoreError::ConcurrencyConflict {
            order_id,
            expected: Version::first(),
        }
        .into();
        assert!(matches!(err, DomainError::Conflict(id) if id == order_id));
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(ErrorKind::InvalidState.as_str(), "invalid_state");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}

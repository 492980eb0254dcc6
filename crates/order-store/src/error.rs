use common::{FeedbackId, OrderId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored revision no longer matches the one the caller read.
    #[error("Concurrency conflict for order {order_id}: expected version {expected}")]
    ConcurrencyConflict { order_id: OrderId, expected: Version },

    /// An order with this id already exists.
    #[error("Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// The order to save does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A different feedback record is already linked to the order.
    #[error("Feedback {existing} already exists for order {order_id}")]
    DuplicateFeedback {
        order_id: OrderId,
        existing: FeedbackId,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrencyConflict { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

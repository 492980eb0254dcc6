use async_trait::async_trait;
use common::{FeedbackId, OrderId, Version};
use domain::{Feedback, Order};

use crate::{OrderQuery, Result};

/// Core trait for order persistence.
///
/// All implementations must be thread-safe (Send + Sync) and must honour the
/// conditional write in [`OrderRepository::save`].
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Inserts a new order at [`Version::first`].
    ///
    /// Fails with `DuplicateOrder` if the id is already taken.
    async fn create(&self, order: Order) -> Result<Order>;

    /// Returns the order, or None if it doesn't exist.
    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the orders matching `query`, sorted and paged as requested.
    async fn find(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Replaces the stored document if its version still equals
    /// `expected_version`, moving it to the next version.
    ///
    /// Fails with `ConcurrencyConflict` when someone else wrote first.
    async fn save(&self, order: Order, expected_version: Version) -> Result<Order>;
}

/// Persistence for feedback records, at most one per order.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Inserts or replaces the record with this id.
    ///
    /// Fails with `DuplicateFeedback` if a different record already exists
    /// for the same order.
    async fn upsert(&self, feedback: Feedback) -> Result<Feedback>;

    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>>;

    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Feedback>>;

    /// All records, oldest first.
    async fn list(&self) -> Result<Vec<Feedback>>;

    /// Removes the record, returning it if it existed.
    async fn delete(&self, id: FeedbackId) -> Result<Option<Feedback>>;
}

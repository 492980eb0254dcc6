use std::sync::Arc;

use async_trait::async_trait;
use common::{FeedbackId, OrderId, Version};
use domain::{Aggregate, Feedback, Order};
use tokio::sync::RwLock;

use crate::{
    OrderQuery, Result, StoreError,
    store::{FeedbackRepository, OrderRepository},
};

/// In-memory store implementation.
///
/// Keeps documents in insertion order and provides the same interface as
/// the PostgreSQL implementation, including the conditional write.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<RwLock<Vec<Order>>>,
    feedback: Arc<RwLock<Vec<Feedback>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders and feedback.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
        self.feedback.write().await.clear();
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(&self, mut order: Order) -> Result<Order> {
        let mut store = self.orders.write().await;
        if store.iter().any(|o| o.id() == order.id()) {
            return Err(StoreError::DuplicateOrder(order.id()));
        }
        order.set_version(Version::first());
        store.push(order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let store = self.orders.read().await;
        Ok(store.iter().find(|o| o.id() == id).cloned())
    }

    async fn find(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let store = self.orders.read().await;
        let mut orders: Vec<Order> = store.iter().filter(|o| query.matches(o)).cloned().collect();
        drop(store);

        // sort_by is stable, so ties keep insertion order
        orders.sort_by(|a, b| query.compare(a, b));

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(orders.into_iter().skip(offset).take(limit).collect())
    }

    async fn save(&self, mut order: Order, expected_version: Version) -> Result<Order> {
        let mut store = self.orders.write().await;
        let slot = store
            .iter_mut()
            .find(|o| o.id() == order.id())
            .ok_or(StoreError::OrderNotFound(order.id()))?;

        if slot.version() != expected_version {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id(),
                expected: expected_version,
            });
        }

        order.set_version(expected_version.next());
        *slot = order.clone();
        Ok(order)
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn upsert(&self, feedback: Feedback) -> Result<Feedback> {
        let mut store = self.feedback.write().await;

        if let Some(other) = store
            .iter()
            .find(|f| f.order_id == feedback.order_id && f.id != feedback.id)
        {
            return Err(StoreError::DuplicateFeedback {
                order_id: feedback.order_id,
                existing: other.id,
            });
        }

        match store.iter_mut().find(|f| f.id == feedback.id) {
            Some(slot) => *slot = feedback.clone(),
            None => store.push(feedback.clone()),
        }
        Ok(feedback)
    }

    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        let store = self.feedback.read().await;
        Ok(store.iter().find(|f| f.id == id).cloned())
    }

    async fn get_by_order(&self, order_id: OrderId) -> Result<Option<Feedback>> {
        let store = self.feedback.read().await;
        Ok(store.iter().find(|f| f.order_id == order_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Feedback>> {
        Ok(self.feedback.read().await.clone())
    }

    async fn delete(&self, id: FeedbackId) -> Result<Option<Feedback>> {
        let mut store = self.feedback.write().await;
        let removed = store
            .iter()
            .position(|f| f.id == id)
            .map(|index| store.remove(index));
        Ok(removed)
    }
}

//! Order list queries for requesters and collectors.

use chrono::NaiveDate;
use common::{CollectorId, Money, RequesterId};
use domain::{Order, OrderStatus};
use order_store::{OrderQuery, OrderRepository, OrderSort};

use crate::error::Result;

/// Default minimum estimate for the high-value list.
pub const DEFAULT_HIGH_VALUE_THRESHOLD: f64 = 1000.0;

/// Canned order lists over the repository.
pub struct OrderQueries<S: OrderRepository> {
    store: S,
}

impl<S: OrderRepository> OrderQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A requester's orders, newest first.
    pub async fn requester_history(&self, requester_id: RequesterId) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(OrderQuery::for_requester(requester_id).sort(OrderSort::NewestFirst))
            .await?)
    }

    /// Orders a collector has taken on, newest first.
    pub async fn collector_history(&self, collector_id: CollectorId) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(OrderQuery::for_collector(collector_id).sort(OrderSort::NewestFirst))
            .await?)
    }

    /// A collector's accepted orders still awaiting pickup.
    pub async fn collector_active(&self, collector_id: CollectorId) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(
                OrderQuery::for_collector(collector_id)
                    .status(OrderStatus::Accepted)
                    .sort(OrderSort::PickupDate),
            )
            .await?)
    }

    /// Unclaimed pending orders, newest first.
    pub async fn pending_orders(&self) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(
                OrderQuery::new()
                    .status(OrderStatus::Pending)
                    .unassigned()
                    .sort(OrderSort::NewestFirst),
            )
            .await?)
    }

    /// Open orders whose pickup falls on `date`.
    pub async fn scheduled_for_day(&self, date: NaiveDate) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(
                OrderQuery::new()
                    .statuses(vec![OrderStatus::Pending, OrderStatus::Accepted])
                    .pickup_on(date),
            )
            .await?)
    }

    /// Unclaimed pending orders estimated at `threshold` or more, highest
    /// first.
    pub async fn high_value_orders(&self, threshold: Money) -> Result<Vec<Order>> {
        Ok(self
            .store
            .find(
                OrderQuery::new()
                    .status(OrderStatus::Pending)
                    .unassigned()
                    .min_estimated_amount(threshold)
                    .sort(OrderSort::EstimatedAmountDesc),
            )
            .await?)
    }
}

//! Order lifecycle events.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CollectorId, Money, OrderId, RequesterId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::LineItem;

/// Events that can occur on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed by a requester.
    OrderCreated(OrderCreatedData),

    /// A collector claimed the pickup.
    OrderAccepted(OrderAcceptedData),

    /// Scrap was collected and the order priced.
    OrderRecycled(OrderRecycledData),

    /// The requester withdrew the order.
    OrderCancelled(OrderCancelledData),

    /// The pickup slot moved.
    OrderRescheduled(OrderRescheduledData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "OrderCreated",
            OrderEvent::OrderAccepted(_) => "OrderAccepted",
            OrderEvent::OrderRecycled(_) => "OrderRecycled",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
            OrderEvent::OrderRescheduled(_) => "OrderRescheduled",
        }
    }
}

impl OrderEvent {
    /// When the event happened.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(d) => d.created_at,
            OrderEvent::OrderAccepted(d) => d.accepted_at,
            OrderEvent::OrderRecycled(d) => d.recycled_at,
            OrderEvent::OrderCancelled(d) => d.cancelled_at,
            OrderEvent::OrderRescheduled(d) => d.rescheduled_at,
        }
    }
}

/// Data for OrderCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedData {
    pub order_id: OrderId,
    pub requester_id: RequesterId,
    pub created_at: DateTime<Utc>,
}

/// Data for OrderAccepted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAcceptedData {
    pub collector_id: CollectorId,
    pub accepted_at: DateTime<Utc>,
}

/// Data for OrderRecycled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecycledData {
    /// Weighed line items, replacing the estimates.
    pub line_items: Vec<LineItem>,

    /// Rounded sum of the actual amounts.
    pub total_amount: Money,

    pub recycled_at: DateTime<Utc>,
}

/// Data for OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub cancelled_by: RequesterId,
    pub cancelled_at: DateTime<Utc>,
}

/// Data for OrderRescheduled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRescheduledData {
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub rescheduled_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    pub fn order_created(order_id: OrderId, requester_id: RequesterId, at: DateTime<Utc>) -> Self {
        OrderEvent::OrderCreated(OrderCreatedData {
            order_id,
            requester_id,
            created_at: at,
        })
    }

    pub fn order_accepted(collector_id: CollectorId, at: DateTime<Utc>) -> Self {
        OrderEvent::OrderAccepted(OrderAcceptedData {
            collector_id,
            accepted_at: at,
        })
    }

    pub fn order_recycled(line_items: Vec<LineItem>, total_amount: Money, at: DateTime<Utc>) -> Self {
        OrderEvent::OrderRecycled(OrderRecycledData {
            line_items,
            total_amount,
            recycled_at: at,
        })
    }

    pub fn order_cancelled(cancelled_by: RequesterId, at: DateTime<Utc>) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            cancelled_by,
            cancelled_at: at,
        })
    }

    pub fn order_rescheduled(
        pickup_date: NaiveDate,
        pickup_time: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        OrderEvent::OrderRescheduled(OrderRescheduledData {
            pickup_date,
            pickup_time: pickup_time.into(),
            rescheduled_at: at,
        })
    }
}

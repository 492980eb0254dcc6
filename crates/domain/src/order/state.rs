//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of a pickup order.
///
/// Transitions:
/// ```text
/// Pending ──► Accepted ──► Recycled
///    │            │
///    └────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Waiting for a collector.
    #[default]
    Pending,

    /// A collector has claimed the pickup.
    Accepted,

    /// The order was withdrawn by its requester (terminal).
    Cancelled,

    /// Scrap was collected and weighed (terminal).
    Recycled,
}

impl OrderStatus {
    /// Returns true if a collector may accept the order.
    pub fn can_accept(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order may be completed.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Accepted)
    }

    /// Returns true if the order may be cancelled.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the pickup slot may still move.
    pub fn can_reschedule(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Recycled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Recycled => "Recycled",
        }
    }

    /// Parses a status name as produced by [`OrderStatus::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(OrderStatus::Pending),
            "Accepted" => Some(OrderStatus::Accepted),
            "Cancelled" => Some(OrderStatus::Cancelled),
            "Recycled" => Some(OrderStatus::Recycled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

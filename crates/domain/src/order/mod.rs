//! Order aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use commands::{CompleteOrder, CreateOrder, RescheduleOrder};
pub use events::{
    OrderAcceptedData, OrderCancelledData, OrderCreatedData, OrderEvent, OrderRecycledData,
    OrderRescheduledData,
};
pub use state::OrderStatus;
pub use value_objects::{LineItem, PickupLocation, TimelineEntry, TimelineKind};

use thiserror::Error;

/// Errors raised when a command is checked against an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A required field is absent or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Contact number must be exactly 10 digits")]
    InvalidContactNumber,

    #[error("At least one line item is required")]
    NoLineItems,

    #[error("Invalid line item at index {index}: {reason}")]
    InvalidLineItem { index: usize, reason: &'static str },

    #[error("Estimated amount must not be negative")]
    NegativeEstimate,

    /// A money amount exceeds what the service accepts.
    #[error("Amount exceeds the maximum of {max}")]
    AmountTooLarge { max: f64 },

    #[error("At least one image is required")]
    NoImages,

    /// Completion amounts summed to zero after rounding.
    #[error("Total amount must be greater than zero")]
    ZeroTotal,

    /// Order is not in a status that allows the action.
    #[error("Invalid state transition: cannot {action} an order in {current_status} status")]
    InvalidStateTransition {
        current_status: OrderStatus,
        action: &'static str,
    },

    /// The collector is not the one assigned to the order.
    #[error("Order is not assigned to this collector")]
    NotAssignedCollector,

    /// The requester does not own the order.
    #[error("Order does not belong to this requester")]
    NotOwner,
}

impl OrderError {
    pub(crate) fn missing(field: &'static str) -> Self {
        OrderError::MissingField { field }
    }

    /// True for malformed input.
    pub fn is_validation(&self) -> bool {
        !self.is_forbidden() && !self.is_invalid_state()
    }

    /// True when the caller may not act on this order.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            OrderError::NotAssignedCollector | OrderError::NotOwner
        )
    }

    /// True when the order's status rules out the action.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, OrderError::InvalidStateTransition { .. })
    }
}

//! Domain layer for the scrap-collection order service.
//!
//! This crate provides:
//! - `Aggregate` and `DomainEvent` traits
//! - the `Order` aggregate with its lifecycle state machine and timeline
//! - the `Feedback` companion entity

pub mod aggregate;
pub mod feedback;
pub mod order;

pub use aggregate::{Aggregate, DomainEvent};
pub use feedback::{Feedback, FeedbackError, FeedbackSide, FeedbackUpdate, Rating};
pub use order::{
    CompleteOrder, CreateOrder, LineItem, Order, OrderError, OrderEvent, OrderStatus,
    PickupLocation, RescheduleOrder, TimelineEntry, TimelineKind,
};

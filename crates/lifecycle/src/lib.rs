//! Order lifecycle engine.
//!
//! [`OrderService`] validates and applies every order transition and queues
//! the resulting notifications. [`FeedbackService`] owns the feedback record
//! attached to an order.

pub mod error;
pub mod feedback;
pub mod notifications;
pub mod service;

pub use error::{DomainError, ErrorKind, Result};
pub use feedback::FeedbackService;
pub use service::OrderService;

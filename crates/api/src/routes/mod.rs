//! HTTP route handlers.

pub mod analytics;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod orders;

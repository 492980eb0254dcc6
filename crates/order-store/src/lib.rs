//! Persistence for orders and their feedback.
//!
//! Orders are stored as whole documents guarded by a revision number. Every
//! write after the first is conditional: it only applies when the stored
//! revision still equals the one the caller read.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{OrderQuery, OrderSort};
pub use store::{FeedbackRepository, OrderRepository};

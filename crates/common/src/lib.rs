//! Shared identifiers and value types.
//!
//! Everything in here is plain data: typed identifiers for each kind of
//! document and identity, the [`Caller`] resolved at the authentication
//! boundary, monetary amounts in minor units and geographic points.

pub mod caller;
pub mod geo;
pub mod ids;
pub mod money;
pub mod version;

pub use caller::{Caller, Role};
pub use geo::GeoPoint;
pub use ids::{AdminId, CollectorId, FeedbackId, NotificationId, OrderId, RequesterId, ScrapTypeId};
pub use money::Money;
pub use version::Version;

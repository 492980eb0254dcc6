//! External collaborators of the order service.
//!
//! Each collaborator is a narrow trait with an in-memory implementation.
//! The in-memory versions back the default binary and the tests; they can be
//! told to fail so error paths can be exercised.

pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod identity;
pub mod image;
pub mod notification;

pub use catalog::{InMemoryScrapCatalog, ScrapCatalog, ScrapInfo};
pub use dispatcher::NotificationDispatcher;
pub use error::{CollaboratorError, Result};
pub use identity::{IdentityStore, InMemoryIdentityStore, Profile};
pub use image::{ImageStore, InMemoryImageStore};
pub use notification::{InMemoryNotificationStore, Notification, NotificationKind, NotificationSink};

//! Core aggregate and domain event traits.

use common::Version;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name. The lifecycle service labels its
    /// transition logs and metrics with it.
    fn event_type(&self) -> &'static str;
}

/// Trait for document aggregates.
///
/// Commands are checked against the current state and produce an event;
/// `apply` folds the event into the document. Persistence stores the whole
/// document, guarded by its [`Version`].
pub trait Aggregate: Send + Sync + Sized {
    /// The type of events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the stored revision of this document.
    fn version(&self) -> Version;

    /// Sets the stored revision. Called by the repository after a write.
    fn set_version(&mut self, version: Version);

    /// Applies an event to the aggregate, updating its state.
    ///
    /// Must be deterministic and must not fail: the command that produced the
    /// event already validated it.
    fn apply(&mut self, event: Self::Event);
}

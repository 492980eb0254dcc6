//! Authenticated caller identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AdminId, CollectorId, RequesterId};

/// The three kinds of identity the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Waste generator who places pickup orders.
    Requester,
    /// Pickup agent who accepts and completes orders.
    Collector,
    /// Back-office administrator.
    Admin,
}

impl Role {
    /// Returns the role name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Collector => "collector",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A caller resolved once at the authentication boundary.
///
/// Carries the typed identifier for its role, so operations that need a
/// collector can only ever be handed a [`CollectorId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Caller {
    Requester(RequesterId),
    Collector(CollectorId),
    Admin(AdminId),
}

impl Caller {
    /// Returns the caller's role.
    pub fn role(&self) -> Role {
        match self {
            Caller::Requester(_) => Role::Requester,
            Caller::Collector(_) => Role::Collector,
            Caller::Admin(_) => Role::Admin,
        }
    }

    /// Returns the raw identifier regardless of role.
    pub fn id(&self) -> Uuid {
        match self {
            Caller::Requester(id) => id.as_uuid(),
            Caller::Collector(id) => id.as_uuid(),
            Caller::Admin(id) => id.as_uuid(),
        }
    }

    /// Returns the requester id if this caller is a requester.
    pub fn as_requester(&self) -> Option<RequesterId> {
        match self {
            Caller::Requester(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the collector id if this caller is a collector.
    pub fn as_collector(&self) -> Option<CollectorId> {
        match self {
            Caller::Collector(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns true for administrators.
    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::Admin(_))
    }
}

impl std::fmt::Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.role(), self.id())
    }
}

//! In-app notifications and the sink that stores them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{NotificationId, OrderId, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CollaboratorError, Result};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    OrderPlaced,
    OrderAccepted,
    OrderRecycled,
    OrderCancelled,
    OrderRescheduled,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderPlaced => "ORDER_PLACED",
            NotificationKind::OrderAccepted => "ORDER_ACCEPTED",
            NotificationKind::OrderRecycled => "ORDER_RECYCLED",
            NotificationKind::OrderCancelled => "ORDER_CANCELLED",
            NotificationKind::OrderRescheduled => "ORDER_RESCHEDULED",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered in-app notification for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub target_id: Uuid,
    pub target_role: Role,
    pub order_id: Option<OrderId>,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    pub fn new(
        target_id: Uuid,
        target_role: Role,
        order_id: Option<OrderId>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            target_id,
            target_role,
            order_id,
            kind,
            title: title.into(),
            message: message.into(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Trait for the notification sink.
///
/// `deliver` accepts a rendered notification; the query methods serve the
/// recipient's in-app inbox.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Stores (and, in a real deployment, pushes) one notification.
    async fn deliver(&self, notification: Notification) -> Result<()>;

    /// The recipient's notifications, newest first.
    async fn list_for(&self, target_id: Uuid) -> Result<Vec<Notification>>;

    /// Marks one of the recipient's notifications as read.
    ///
    /// Returns None if the notification doesn't exist or belongs to someone
    /// else.
    async fn mark_read(&self, id: NotificationId, target_id: Uuid) -> Result<Option<Notification>>;

    /// Removes one of the recipient's notifications and returns it.
    ///
    /// Returns None if the notification doesn't exist or belongs to someone
    /// else.
    async fn delete(&self, id: NotificationId, target_id: Uuid) -> Result<Option<Notification>>;
}

/// In-memory notification store for testing and the default binary.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<Vec<Notification>>>,
    fail_on_deliver: Arc<AtomicBool>,
}

impl InMemoryNotificationStore {
    /// Creates a new empty notification store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the store to reject deliveries.
    pub fn set_fail_on_deliver(&self, fail: bool) {
        self.fail_on_deliver.store(fail, Ordering::SeqCst);
    }

    /// Returns every stored notification in delivery order.
    pub async fn all(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationStore {
    async fn deliver(&self, notification: Notification) -> Result<()> {
        if self.fail_on_deliver.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Delivery("sink unavailable".to_string()));
        }
        self.notifications.write().await.push(notification);
        Ok(())
    }

    async fn list_for(&self, target_id: Uuid) -> Result<Vec<Notification>> {
        let store = self.notifications.read().await;
        let mut mine: Vec<Notification> = store
            .iter()
            .filter(|n| n.target_id == target_id)
            .cloned()
            .collect();
        // Delivery order breaks ties, latest delivery first.
        mine.reverse();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    async fn mark_read(&self, id: NotificationId, target_id: Uuid) -> Result<Option<Notification>> {
        let mut store = self.notifications.write().await;
        Ok(store
            .iter_mut()
            .find(|n| n.id == id && n.target_id == target_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn delete(&self, id: NotificationId, target_id: Uuid) -> Result<Option<Notification>> {
        let mut store = self.notifications.write().await;
        Ok(store
            .iter()
            .position(|n| n.id == id && n.target_id == target_id)
            .map(|index| store.remove(index)))
    }
}

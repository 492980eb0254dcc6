//! The order lifecycle engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use collaborators::{IdentityStore, ImageStore, NotificationDispatcher, NotificationKind};
use common::{Caller, CollectorId, OrderId, RequesterId};
use domain::{
    Aggregate, CompleteOrder, CreateOrder, DomainEvent, Order, OrderError, OrderEvent,
    RescheduleOrder,
};
use order_store::OrderRepository;

use crate::error::{DomainError, Result};
use crate::notifications;

/// Validates and applies every order state transition.
///
/// Each mutating operation is a read-modify-write closed by a conditional
/// write on the order version. Notifications are queued only after the write
/// has succeeded.
pub struct OrderService<S: OrderRepository> {
    store: S,
    images: Arc<dyn ImageStore>,
    identity: Arc<dyn IdentityStore>,
    notifier: NotificationDispatcher,
}

impl<S: OrderRepository> OrderService<S> {
    /// Creates a new order service.
    pub fn new(
        store: S,
        images: Arc<dyn ImageStore>,
        identity: Arc<dyn IdentityStore>,
        notifier: NotificationDispatcher,
    ) -> Self {
        Self {
            store,
            images,
            identity,
            notifier,
        }
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new pending order.
    ///
    /// Every image is uploaded before anything is written; the first failed
    /// upload aborts the whole operation.
    #[tracing::instrument(skip(self, cmd), fields(caller = %caller))]
    pub async fn create_order(&self, caller: Caller, cmd: CreateOrder) -> Result<Order> {
        let requester = require_requester(caller, "create orders")?;
        cmd.validate()?;

        let mut urls = Vec::with_capacity(cmd.images.len());
        for image in &cmd.images {
            match self.images.store(image).await {
                Some(url) => urls.push(url),
                None => {
                    tracing::warn!(%image, "image upload failed");
                    return Err(DomainError::Upload(format!("could not store {image}")));
                }
            }
        }

        let (order, created) = Order::create(
            OrderId::new(),
            requester,
            cmd.with_images(urls),
            Utc::now(),
        )?;
        let order = self.store.create(order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %order.id(),
            event = created.event_type(),
            at = %created.occurred_at(),
            "order created"
        );

        self.dispatch(&order, NotificationKind::OrderPlaced, None);
        Ok(order)
    }

    /// Claims a pending order for the calling collector.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn accept_order(&self, caller: Caller, order_id: OrderId) -> Result<Order> {
        let collector = require_collector(caller, "accept orders")?;

        let order = self
            .transition(order_id, |order, at| order.accept(collector, at))
            .await?;

        let collector_name = match self.identity.profile(caller).await {
            Ok(profile) => profile.map(|p| p.full_name),
            Err(e) => {
                tracing::warn!(%order_id, error = %e, "collector profile lookup failed");
                None
            }
        };
        self.dispatch(
            &order,
            NotificationKind::OrderAccepted,
            collector_name.as_deref(),
        );
        Ok(order)
    }

    /// Records the weighed line items and marks the order recycled.
    #[tracing::instrument(skip(self, cmd), fields(caller = %caller))]
    pub async fn complete_order(
        &self,
        caller: Caller,
        order_id: OrderId,
        cmd: CompleteOrder,
    ) -> Result<Order> {
        let collector = require_collector(caller, "complete orders")?;

        let order = self
            .transition(order_id, move |order, at| {
                order.complete(collector, cmd, at)
            })
            .await?;

        self.dispatch(&order, NotificationKind::OrderRecycled, None);
        Ok(order)
    }

    /// Cancels an order on behalf of its requester.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn cancel_order(&self, caller: Caller, order_id: OrderId) -> Result<Order> {
        let requester = require_requester(caller, "cancel orders")?;

        let order = self
            .transition(order_id, |order, at| order.cancel(requester, at))
            .await?;

        self.dispatch(&order, NotificationKind::OrderCancelled, None);
        Ok(order)
    }

    /// Moves the pickup slot of an open order.
    #[tracing::instrument(skip(self, cmd), fields(caller = %caller))]
    pub async fn reschedule_order(
        &self,
        caller: Caller,
        order_id: OrderId,
        cmd: RescheduleOrder,
    ) -> Result<Order> {
        let requester = require_requester(caller, "reschedule orders")?;
        cmd.validate()?;

        let order = self
            .transition(order_id, |order, at| {
                order.reschedule(requester, &cmd, at)
            })
            .await?;

        self.dispatch(&order, NotificationKind::OrderRescheduled, None);
        Ok(order)
    }

    /// Loads an order the caller is allowed to see.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn get_order(&self, caller: Caller, order_id: OrderId) -> Result<Order> {
        let order = self.load(order_id).await?;
        if !order.is_visible_to(&caller) {
            return Err(DomainError::forbidden("order is not visible to this caller"));
        }
        Ok(order)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))
    }

    /// Loads the order, decides the event, applies it and writes the result
    /// back conditioned on the version that was read. Logs and metrics are
    /// labelled with the event type.
    async fn transition<F>(&self, order_id: OrderId, decide: F) -> Result<Order>
    where
        F: FnOnce(&Order, DateTime<Utc>) -> std::result::Result<OrderEvent, OrderError>,
    {
        let mut order = self.load(order_id).await?;
        let expected = order.version();

        // Timeline timestamps never run backwards, even across clock skew.
        let at = Utc::now().max(order.updated_at());
        let event = decide(&order, at)?;
        let transition = event.event_type();
        order.apply(event);

        match self.store.save(order, expected).await {
            Ok(saved) => {
                metrics::counter!("order_transitions_total", "transition" => transition)
                    .increment(1);
                tracing::info!(%order_id, transition, status = %saved.status(), "order transitioned");
                Ok(saved)
            }
            Err(e) if e.is_conflict() => {
                metrics::counter!("order_transition_conflicts_total", "transition" => transition)
                    .increment(1);
                tracing::warn!(%order_id, transition, "order changed concurrently, write rejected");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn dispatch(&self, order: &Order, kind: NotificationKind, collector_name: Option<&str>) {
        for notification in notifications::render(order, kind, collector_name) {
            self.notifier.notify(notification);
        }
    }
}

fn require_requester(caller: Caller, action: &str) -> Result<RequesterId> {
    caller
        .as_requester()
        .ok_or_else(|| DomainError::forbidden(format!("only requesters can {action}")))
}

fn require_collector(caller: Caller, action: &str) -> Result<CollectorId> {
    caller
        .as_collector()
        .ok_or_else(|| DomainError::forbidden(format!("only collectors can {action}")))
}

//! Feedback on orders.

use chrono::Utc;
use common::{Caller, CollectorId, FeedbackId, OrderId, RequesterId};
use domain::{Aggregate, Feedback, FeedbackSide, FeedbackUpdate, Order};
use order_store::{FeedbackRepository, OrderQuery, OrderRepository, StoreError};

use crate::error::{DomainError, Result};

/// Attempts at relinking an order before giving up on a busy document.
const LINK_ATTEMPTS: usize = 3;

/// Service for reading and writing order feedback.
///
/// This service is the only writer of an order's `feedback_id`.
pub struct FeedbackService<S> {
    store: S,
}

impl<S> FeedbackService<S>
where
    S: OrderRepository + FeedbackRepository,
{
    /// Creates a new feedback service.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Writes one side of an order's feedback, creating the record on first
    /// use. The requester writes the requester side and the assigned
    /// collector writes the collector side.
    #[tracing::instrument(skip(self, update), fields(caller = %caller))]
    pub async fn upsert(
        &self,
        caller: Caller,
        order_id: OrderId,
        update: FeedbackUpdate,
    ) -> Result<Feedback> {
        let order = self.load_order(order_id).await?;
        let side = match caller {
            Caller::Requester(id) if id == order.requester_id() => FeedbackSide::Requester,
            Caller::Collector(id) if order.collector_id() == Some(id) => FeedbackSide::Collector,
            _ => {
                return Err(DomainError::forbidden(
                    "only the order's requester or assigned collector can leave feedback",
                ));
            }
        };

        let now = Utc::now();
        let mut feedback = match self.store.get_by_order(order_id).await? {
            Some(existing) => existing,
            None => Feedback::new(order_id, now),
        };
        feedback.apply_update(side, update, now)?;

        let feedback = match self.store.upsert(feedback).await {
            Ok(saved) => saved,
            Err(StoreError::DuplicateFeedback { .. }) => {
                return Err(DomainError::Conflict(order_id));
            }
            Err(e) => return Err(e.into()),
        };

        if order.feedback_id() != Some(feedback.id) {
            self.link(order_id, Some(feedback.id)).await?;
            tracing::info!(%order_id, feedback_id = %feedback.id, "feedback linked to order");
        }
        Ok(feedback)
    }

    /// Loads a feedback record visible to the caller.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn get(&self, caller: Caller, id: FeedbackId) -> Result<Feedback> {
        let feedback = self
            .store
            .get(id)
            .await?
            .ok_or(DomainError::FeedbackNotFound(id))?;

        if !caller.is_admin() {
            let order = self.store.get_by_id(feedback.order_id).await?;
            if !order.is_some_and(|o| is_party(&o, &caller)) {
                return Err(DomainError::forbidden("feedback is not visible to this caller"));
            }
        }
        Ok(feedback)
    }

    /// Loads the feedback of an order, if any has been left.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn get_by_order(&self, caller: Caller, order_id: OrderId) -> Result<Option<Feedback>> {
        let order = self.load_order(order_id).await?;
        if !caller.is_admin() && !is_party(&order, &caller) {
            return Err(DomainError::forbidden("feedback is not visible to this caller"));
        }
        Ok(self.store.get_by_order(order_id).await?)
    }

    /// Lists every feedback record.
    pub async fn list_all(&self, caller: Caller) -> Result<Vec<Feedback>> {
        require_admin(&caller)?;
        Ok(self.store.list().await?)
    }

    /// Lists feedback on orders assigned to a collector.
    pub async fn list_for_collector(
        &self,
        caller: Caller,
        collector_id: CollectorId,
    ) -> Result<Vec<Feedback>> {
        require_admin(&caller)?;
        let orders = self.store.find(OrderQuery::for_collector(collector_id)).await?;
        self.feedback_of(&orders).await
    }

    /// Lists feedback on a requester's orders.
    pub async fn list_for_requester(
        &self,
        caller: Caller,
        requester_id: RequesterId,
    ) -> Result<Vec<Feedback>> {
        require_admin(&caller)?;
        let orders = self.store.find(OrderQuery::for_requester(requester_id)).await?;
        self.feedback_of(&orders).await
    }

    /// Removes a feedback record and unlinks it from its order. The order's
    /// status and timeline are left alone.
    #[tracing::instrument(skip(self), fields(caller = %caller))]
    pub async fn delete(&self, caller: Caller, id: FeedbackId) -> Result<Feedback> {
        require_admin(&caller)?;
        let removed = self
            .store
            .delete(id)
            .await?
            .ok_or(DomainError::FeedbackNotFound(id))?;

        match self.link(removed.order_id, None).await {
            Ok(()) | Err(DomainError::OrderNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        tracing::info!(feedback_id = %id, order_id = %removed.order_id, "feedback deleted");
        Ok(removed)
    }

    async fn load_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))
    }

    async fn feedback_of(&self, orders: &[Order]) -> Result<Vec<Feedback>> {
        let mut out = Vec::new();
        for id in orders.iter().filter_map(Order::feedback_id) {
            if let Some(feedback) = self.store.get(id).await? {
                out.push(feedback);
            }
        }
        Ok(out)
    }

    /// Points the order's `feedback_id` at `feedback_id`, retrying when a
    /// lifecycle transition wins the conditional write in between.
    async fn link(&self, order_id: OrderId, feedback_id: Option<FeedbackId>) -> Result<()> {
        for _ in 0..LINK_ATTEMPTS {
            let mut order = self.load_order(order_id).await?;
            if order.feedback_id() == feedback_id {
                return Ok(());
            }

            let expected = order.version();
            order.detach_feedback();
            if let Some(id) = feedback_id {
                order.attach_feedback(id);
            }

            match self.store.save(order, expected).await {
                Ok(_) => return Ok(()),
                Err(e) if e.is_conflict() => {
                    tracing::debug!(%order_id, "order changed while linking feedback, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DomainError::Conflict(order_id))
    }
}

fn is_party(order: &Order, caller: &Caller) -> bool {
    match caller {
        Caller::Admin(_) => true,
        Caller::Requester(id) => *id == order.requester_id(),
        Caller::Collector(id) => order.collector_id() == Some(*id),
    }
}

fn require_admin(caller: &Caller) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("admin access required"))
    }
}

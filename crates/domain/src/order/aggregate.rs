//! Order aggregate implementation.

use chrono::{DateTime, NaiveDate, Utc};
use common::{Caller, CollectorId, FeedbackId, Money, OrderId, RequesterId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    CompleteOrder, CreateOrder, LineItem, OrderError, OrderEvent, OrderStatus, PickupLocation,
    RescheduleOrder, TimelineEntry, TimelineKind, value_objects::validate_line_items,
};

/// Order aggregate root.
///
/// A pickup order from placement through collection or cancellation. The
/// whole document is persisted at once, so `status` and `timeline` can never
/// drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,

    /// Storage revision for the conditional write.
    #[serde(default)]
    version: Version,

    requester_id: RequesterId,

    /// Set exactly once, on acceptance.
    collector_id: Option<CollectorId>,

    pickup_location: PickupLocation,
    pickup_date: NaiveDate,
    pickup_time: String,
    contact_number: String,
    status: OrderStatus,

    /// Estimates until completion, weighed actuals afterwards.
    line_items: Vec<LineItem>,

    estimated_amount: Money,

    /// Present only once recycled.
    total_amount: Option<Money>,

    images: Vec<String>,
    feedback_id: Option<FeedbackId>,
    timeline: Vec<TimelineEntry>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Aggregate for Order {
    type Event = OrderEvent;

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        let at = event.occurred_at();
        let (kind, message) = match event {
            OrderEvent::OrderCreated(_) => (TimelineKind::OrderCreated, "Order placed".to_string()),
            OrderEvent::OrderAccepted(data) => {
                self.collector_id = Some(data.collector_id);
                self.status = OrderStatus::Accepted;
                (
                    TimelineKind::OrderAccepted,
                    "Order accepted by collector".to_string(),
                )
            }
            OrderEvent::OrderRecycled(data) => {
                self.line_items = data.line_items;
                self.total_amount = Some(data.total_amount);
                self.status = OrderStatus::Recycled;
                (
                    TimelineKind::OrderRecycled,
                    format!("Scrap collected, total amount {}", data.total_amount),
                )
            }
            OrderEvent::OrderCancelled(_) => {
                self.status = OrderStatus::Cancelled;
                (
                    TimelineKind::OrderCancelled,
                    "Order cancelled by requester".to_string(),
                )
            }
            OrderEvent::OrderRescheduled(data) => {
                let message = format!(
                    "Pickup rescheduled to {} {}",
                    data.pickup_date, data.pickup_time
                );
                self.pickup_date = data.pickup_date;
                self.pickup_time = data.pickup_time;
                (TimelineKind::OrderRescheduled, message)
            }
        };

        self.timeline.push(TimelineEntry {
            timestamp: at,
            kind,
            message,
        });
        self.updated_at = at;
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn requester_id(&self) -> RequesterId {
        self.requester_id
    }

    pub fn collector_id(&self) -> Option<CollectorId> {
        self.collector_id
    }

    pub fn pickup_location(&self) -> &PickupLocation {
        &self.pickup_location
    }

    pub fn pickup_date(&self) -> NaiveDate {
        self.pickup_date
    }

    pub fn pickup_time(&self) -> &str {
        &self.pickup_time
    }

    pub fn contact_number(&self) -> &str {
        &self.contact_number
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn estimated_amount(&self) -> Money {
        self.estimated_amount
    }

    pub fn total_amount(&self) -> Option<Money> {
        self.total_amount
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn feedback_id(&self) -> Option<FeedbackId> {
        self.feedback_id
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sum of line-item weights in kilograms.
    pub fn total_weight_kg(&self) -> f64 {
        self.line_items.iter().map(|item| item.weight_kg).sum()
    }

    /// When the order was accepted, if it ever was.
    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.timeline_time(TimelineKind::OrderAccepted)
    }

    /// When the order was recycled, if it was.
    pub fn recycled_at(&self) -> Option<DateTime<Utc>> {
        self.timeline_time(TimelineKind::OrderRecycled)
    }

    fn timeline_time(&self, kind: TimelineKind) -> Option<DateTime<Utc>> {
        self.timeline
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.timestamp)
    }

    /// Whether `caller` may read this order.
    ///
    /// Admins, the requester and the assigned collector always may. Any
    /// collector may look at an order that is still pending so it can decide
    /// whether to accept it.
    pub fn is_visible_to(&self, caller: &Caller) -> bool {
        match caller {
            Caller::Admin(_) => true,
            Caller::Requester(id) => *id == self.requester_id,
            Caller::Collector(id) => {
                self.collector_id == Some(*id)
                    || (self.status == OrderStatus::Pending && self.collector_id.is_none())
            }
        }
    }
}

// Command methods (return events)
impl Order {
    /// Builds a new pending order.
    ///
    /// The returned order already carries its `OrderCreated` timeline entry.
    pub fn create(
        order_id: OrderId,
        requester_id: RequesterId,
        cmd: CreateOrder,
        at: DateTime<Utc>,
    ) -> Result<(Order, OrderEvent), OrderError> {
        cmd.validate()?;

        let mut order = Order {
            id: order_id,
            version: Version::initial(),
            requester_id,
            collector_id: None,
            pickup_location: cmd.pickup_location,
            pickup_date: cmd.pickup_date,
            pickup_time: cmd.pickup_time.trim().to_string(),
            contact_number: cmd.contact_number,
            status: OrderStatus::Pending,
            line_items: cmd.line_items,
            estimated_amount: cmd.estimated_amount,
            total_amount: None,
            images: cmd.images,
            feedback_id: None,
            timeline: Vec::new(),
            created_at: at,
            updated_at: at,
        };

        let event = OrderEvent::order_created(order_id, requester_id, at);
        order.apply(event.clone());
        Ok((order, event))
    }

    /// Claims a pending order for a collector.
    pub fn accept(&self, collector: CollectorId, at: DateTime<Utc>) -> Result<OrderEvent, OrderError> {
        if !self.status.can_accept() || self.collector_id.is_some() {
            return Err(self.invalid("accept"));
        }
        Ok(OrderEvent::order_accepted(collector, at))
    }

    /// Completes an accepted order with weighed actuals.
    pub fn complete(
        &self,
        collector: CollectorId,
        cmd: CompleteOrder,
        at: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        if self.collector_id != Some(collector) {
            return Err(OrderError::NotAssignedCollector);
        }
        if !self.status.can_complete() {
            return Err(self.invalid("complete"));
        }

        validate_line_items(&cmd.line_items)?;
        let sum: f64 = cmd.line_items.iter().map(|item| item.amount).sum();
        let total = Money::try_from_major(sum).ok_or(OrderError::AmountTooLarge {
            max: Money::MAX_MAJOR,
        })?;
        if total.is_zero() {
            return Err(OrderError::ZeroTotal);
        }

        Ok(OrderEvent::order_recycled(cmd.line_items, total, at))
    }

    /// Cancels the order on behalf of its requester.
    pub fn cancel(&self, requester: RequesterId, at: DateTime<Utc>) -> Result<OrderEvent, OrderError> {
        if !self.status.can_cancel() {
            return Err(self.invalid("cancel"));
        }
        if requester != self.requester_id {
            return Err(OrderError::NotOwner);
        }
        Ok(OrderEvent::order_cancelled(requester, at))
    }

    /// Moves the pickup slot.
    pub fn reschedule(
        &self,
        requester: RequesterId,
        cmd: &RescheduleOrder,
        at: DateTime<Utc>,
    ) -> Result<OrderEvent, OrderError> {
        let (date, time) = cmd.validate()?;
        if requester != self.requester_id {
            return Err(OrderError::NotOwner);
        }
        if !self.status.can_reschedule() {
            return Err(self.invalid("reschedule"));
        }
        Ok(OrderEvent::order_rescheduled(date, time, at))
    }

    /// Links feedback to this order. Returns false if a different feedback
    /// record is already linked.
    pub fn attach_feedback(&mut self, feedback_id: FeedbackId) -> bool {
        match self.feedback_id {
            Some(existing) => existing == feedback_id,
            None => {
                self.feedback_id = Some(feedback_id);
                true
            }
        }
    }

    /// Unlinks feedback without touching status or timeline.
    pub fn detach_feedback(&mut self) {
        self.feedback_id = None;
    }

    fn invalid(&self, action: &'static str) -> OrderError {
        OrderError::InvalidStateTransition {
            current_status: self.status,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::ScrapTypeId;

    fn create_cmd() -> CreateOrder {
        CreateOrder {
            pickup_location: PickupLocation::new("Lazimpat, Kathmandu", 27.72, 85.32),
            pickup_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            pickup_time: "09:00-11:00".to_string(),
            contact_number: "9812345678".to_string(),
            line_items: vec![
                LineItem::new(ScrapTypeId::new(), 10.0, 200.0),
                LineItem::new(ScrapTypeId::new(), 5.0, 300.0),
            ],
            estimated_amount: Money::from_major(500.0),
            images: vec!["https://img/1.jpg".to_string()],
        }
    }

    fn create_order() -> Order {
        Order::create(OrderId::new(), RequesterId::new(), create_cmd(), Utc::now())
            .unwrap()
            .0
    }

    fn accepted_order(collector: CollectorId) -> Order {
        let mut order = create_order();
        let event = order.accept(collector, Utc::now()).unwrap();
        order.apply(event);
        order
    }

    #[test]
    fn create_seeds_timeline() {
        let order = create_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.timeline().len(), 1);
        assert_eq!(order.timeline()[0].kind, TimelineKind::OrderCreated);
        assert!(order.collector_id().is_none());
        assert!(order.total_amount().is_none());
        assert_eq!(order.estimated_amount(), Money::from_major(500.0));
    }

    #[test]
    fn create_rejects_invalid_command() {
        let mut cmd = create_cmd();
        cmd.contact_number = "98-1234567".to_string();
        let result = Order::create(OrderId::new(), RequesterId::new(), cmd, Utc::now());
        assert!(matches!(result, Err(OrderError::InvalidContactNumber)));
    }

    #[test]
    fn accept_assigns_collector() {
        let collector = CollectorId::new();
        let order = accepted_order(collector);
        assert_eq!(order.status(), OrderStatus::Accepted);
        assert_eq!(order.collector_id(), Some(collector));
        assert_eq!(order.timeline().len(), 2);
        assert!(order.accepted_at().is_some());
    }

    #[test]
    fn accept_twice_fails() {
        let order = accepted_order(CollectorId::new());
        let err = order.accept(CollectorId::new(), Utc::now()).unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn complete_totals_actual_amounts() {
        let collector = CollectorId::new();
        let mut order = accepted_order(collector);

        let actuals = vec![
            LineItem::new(ScrapTypeId::new(), 12.0, 400.004),
            LineItem::new(ScrapTypeId::new(), 6.0, 250.0),
        ];
        let event = order
            .complete(collector, CompleteOrder::new(actuals.clone()), Utc::now())
            .unwrap();
        order.apply(event);

        assert_eq!(order.status(), OrderStatus::Recycled);
        assert_eq!(order.total_amount(), Some(Money::from_major(650.0)));
        assert_eq!(order.line_items(), actuals.as_slice());
        assert_eq!(order.estimated_amount(), Money::from_major(500.0));
        assert_eq!(order.timeline().len(), 3);
        assert_eq!(order.total_weight_kg(), 18.0);
        assert!(order.recycled_at().is_some());
    }

    #[test]
    fn complete_by_other_collector_is_forbidden() {
        let order = accepted_order(CollectorId::new());
        let err = order
            .complete(
                CollectorId::new(),
                CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 1.0, 1.0)]),
                Utc::now(),
            )
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn complete_pending_order_is_forbidden_for_unassigned_collector() {
        let order = create_order();
        let err = order
            .complete(
                CollectorId::new(),
                CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 1.0, 1.0)]),
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::NotAssignedCollector));
    }

    #[test]
    fn complete_rejects_zero_total() {
        let collector = CollectorId::new();
        let order = accepted_order(collector);

        let zero = CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 3.0, 0.001)]);
        assert!(matches!(
            order.complete(collector, zero, Utc::now()),
            Err(OrderError::ZeroTotal)
        ));

        let empty = CompleteOrder::new(vec![]);
        assert!(matches!(
            order.complete(collector, empty, Utc::now()),
            Err(OrderError::NoLineItems)
        ));
    }

    #[test]
    fn complete_rejects_amounts_above_maximum() {
        let collector = CollectorId::new();
        let order = accepted_order(collector);

        let huge = CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 1.0, 5e16)]);
        assert!(matches!(
            order.complete(collector, huge, Utc::now()),
            Err(OrderError::InvalidLineItem { index: 0, .. })
        ));

        // Each item is in range but the sum is not.
        let half = Money::MAX_MAJOR / 2.0 + 1.0;
        let split = CompleteOrder::new(vec![
            LineItem::new(ScrapTypeId::new(), 1.0, half),
            LineItem::new(ScrapTypeId::new(), 1.0, half),
        ]);
        let err = order.complete(collector, split, Utc::now()).unwrap_err();
        assert!(matches!(err, OrderError::AmountTooLarge { .. }));
        assert!(err.is_validation());
    }

    #[test]
    fn cancel_pending_and_accepted() {
        let mut order = create_order();
        let requester = order.requester_id();
        let event = order.cancel(requester, Utc::now()).unwrap();
        order.apply(event);
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.timeline().len(), 2);

        let accepted = accepted_order(CollectorId::new());
        assert!(accepted.cancel(accepted.requester_id(), Utc::now()).is_ok());
    }

    #[test]
    fn cancel_checks_state_before_ownership() {
        let mut order = create_order();
        let event = order.cancel(order.requester_id(), Utc::now()).unwrap();
        order.apply(event);

        let err = order.cancel(RequesterId::new(), Utc::now()).unwrap_err();
        assert!(err.is_invalid_state());

        let fresh = create_order();
        let err = fresh.cancel(RequesterId::new(), Utc::now()).unwrap_err();
        assert!(err.is_forbidden());
    }

    #[test]
    fn cancelled_order_cannot_be_accepted() {
        let mut order = create_order();
        let event = order.cancel(order.requester_id(), Utc::now()).unwrap();
        order.apply(event);
        assert!(order.accept(CollectorId::new(), Utc::now()).is_err());
    }

    #[test]
    fn reschedule_moves_slot() {
        let collector = CollectorId::new();
        let mut order = accepted_order(collector);
        let new_date = order.pickup_date() + Duration::days(2);

        let event = order
            .reschedule(
                order.requester_id(),
                &RescheduleOrder::new(new_date, "15:00-17:00"),
                Utc::now(),
            )
            .unwrap();
        order.apply(event);

        assert_eq!(order.pickup_date(), new_date);
        assert_eq!(order.pickup_time(), "15:00-17:00");
        assert_eq!(order.status(), OrderStatus::Accepted);
        assert_eq!(order.timeline().len(), 3);
        assert_eq!(order.timeline()[2].kind, TimelineKind::OrderRescheduled);
    }

    #[test]
    fn reschedule_rejects_other_requester_and_terminal_orders() {
        let order = create_order();
        let cmd = RescheduleOrder::new(order.pickup_date(), "noon");
        assert!(matches!(
            order.reschedule(RequesterId::new(), &cmd, Utc::now()),
            Err(OrderError::NotOwner)
        ));

        let mut cancelled = create_order();
        let event = cancelled.cancel(cancelled.requester_id(), Utc::now()).unwrap();
        cancelled.apply(event);
        let err = cancelled
            .reschedule(cancelled.requester_id(), &cmd, Utc::now())
            .unwrap_err();
        assert!(err.is_invalid_state());
    }

    #[test]
    fn visibility_rules() {
        let pending = create_order();
        let any_collector = Caller::Collector(CollectorId::new());
        assert!(pending.is_visible_to(&any_collector));
        assert!(pending.is_visible_to(&Caller::Requester(pending.requester_id())));
        assert!(!pending.is_visible_to(&Caller::Requester(RequesterId::new())));
        assert!(pending.is_visible_to(&Caller::Admin(common::AdminId::new())));

        let collector = CollectorId::new();
        let accepted = accepted_order(collector);
        assert!(accepted.is_visible_to(&Caller::Collector(collector)));
        assert!(!accepted.is_visible_to(&any_collector));
    }

    #[test]
    fn feedback_attach_and_detach_leave_timeline_alone() {
        let mut order = create_order();
        let feedback = FeedbackId::new();

        assert!(order.attach_feedback(feedback));
        assert!(order.attach_feedback(feedback));
        assert!(!order.attach_feedback(FeedbackId::new()));
        assert_eq!(order.feedback_id(), Some(feedback));

        order.detach_feedback();
        assert_eq!(order.feedback_id(), None);
        assert_eq!(order.timeline().len(), 1);
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn serialization_round_trip() {
        let order = accepted_order(CollectorId::new());
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "Accepted");
        let restored: Order = serde_json::from_value(json).unwrap();
        assert_eq!(restored, order);
    }
}

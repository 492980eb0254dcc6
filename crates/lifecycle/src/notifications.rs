//! Rendering of lifecycle notifications.

use collaborators::{Notification, NotificationKind};
use common::Role;
use domain::Order;

/// Builds the notifications for an order that just reached `kind`.
///
/// The requester always gets one. The assigned collector also gets one for
/// recycle, cancel and reschedule; an accepting collector is not told about
/// its own acceptance.
pub fn render(order: &Order, kind: NotificationKind, collector_name: Option<&str>) -> Vec<Notification> {
    let short = order.id().short();
    let schedule = format!("{} ({})", order.pickup_date(), order.pickup_time());

    let (title, requester_message, collector_message) = match kind {
        NotificationKind::OrderPlaced => (
            "Order Placed",
            format!("Your order #{short} has been placed for pickup on {schedule}."),
            None,
        ),
        NotificationKind::OrderAccepted => (
            "Order Accepted",
            format!(
                "Your order #{short} has been accepted by {}.",
                collector_name.unwrap_or("a collector")
            ),
            None,
        ),
        NotificationKind::OrderRecycled => (
            "Order Recycled",
            format!("Your order #{short} has been marked as recycled."),
            Some(format!("Order #{short} has been recycled.")),
        ),
        NotificationKind::OrderCancelled => (
            "Order Cancelled",
            format!("Your order #{short} has been cancelled."),
            Some(format!("Order #{short} has been cancelled.")),
        ),
        NotificationKind::OrderRescheduled => (
            "Order Rescheduled",
            format!("Your order #{short} has been rescheduled to {schedule}."),
            Some(format!("Order #{short} has been rescheduled to {schedule}.")),
        ),
    };

    let mut out = vec![Notification::new(
        order.requester_id().as_uuid(),
        Role::Requester,
        Some(order.id()),
        kind,
        title,
        requester_message,
    )];

    if let (Some(message), Some(collector)) = (collector_message, order.collector_id()) {
        out.push(Notification::new(
            collector.as_uuid(),
            Role::Collector,
            Some(order.id()),
            kind,
            title,
            message,
        ));
    }
    out
}

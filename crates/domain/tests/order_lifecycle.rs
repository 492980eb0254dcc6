//! Integration tests for the Order aggregate state machine.
//!
//! These walk whole lifecycles through the public API and check the
//! properties that must hold for every path.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use common::{CollectorId, Money, OrderId, RequesterId, ScrapTypeId};
use domain::{
    Aggregate, CompleteOrder, CreateOrder, DomainEvent, LineItem, Order, OrderStatus,
    PickupLocation, RescheduleOrder, TimelineKind,
};

fn create_cmd() -> CreateOrder {
    CreateOrder {
        pickup_location: PickupLocation::new("Patan Durbar Square", 27.6727, 85.3253),
        pickup_date: NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
        pickup_time: "morning".to_string(),
        contact_number: "9801234567".to_string(),
        line_items: vec![
            LineItem::new(ScrapTypeId::new(), 20.0, 300.0),
            LineItem::new(ScrapTypeId::new(), 8.0, 200.0),
        ],
        estimated_amount: Money::from_major(500.0),
        images: vec!["https://cdn/1.jpg".into(), "https://cdn/2.jpg".into()],
    }
}

/// An action that may or may not be legal against the current order.
#[derive(Debug, Clone, Copy)]
enum Step {
    Accept,
    Complete,
    Cancel,
    Reschedule,
}

fn try_step(order: &mut Order, step: Step, collector: CollectorId) -> bool {
    let at = order.updated_at() + Duration::minutes(5);
    let result = match step {
        Step::Accept => order.accept(collector, at),
        Step::Complete => order.complete(
            collector,
            CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 30.0, 650.0)]),
            at,
        ),
        Step::Cancel => order.cancel(order.requester_id(), at),
        Step::Reschedule => order.reschedule(
            order.requester_id(),
            &RescheduleOrder::new(order.pickup_date() + Duration::days(1), "evening"),
            at,
        ),
    };
    match result {
        Ok(event) => {
            order.apply(event);
            true
        }
        Err(_) => false,
    }
}

fn rank(status: OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending => 0,
        OrderStatus::Accepted => 1,
        OrderStatus::Cancelled | OrderStatus::Recycled => 2,
    }
}

#[test]
fn happy_path_create_accept_complete() {
    let collector = CollectorId::new();
    let t0 = Utc.with_ymd_and_hms(2025, 4, 9, 8, 0, 0).unwrap();
    let (mut order, created) =
        Order::create(OrderId::new(), RequesterId::new(), create_cmd(), t0).unwrap();

    assert_eq!(created.event_type(), "OrderCreated");
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.timeline().len(), 1);

    let accepted = order.accept(collector, t0 + Duration::hours(1)).unwrap();
    order.apply(accepted);
    assert_eq!(order.status(), OrderStatus::Accepted);
    assert_eq!(order.collector_id(), Some(collector));
    assert_eq!(order.timeline().len(), 2);

    let actuals = vec![
        LineItem::new(ScrapTypeId::new(), 25.0, 400.0),
        LineItem::new(ScrapTypeId::new(), 10.0, 250.0),
    ];
    let recycled = order
        .complete(collector, CompleteOrder::new(actuals), t0 + Duration::hours(3))
        .unwrap();
    order.apply(recycled);

    assert_eq!(order.status(), OrderStatus::Recycled);
    assert_eq!(order.total_amount(), Some(Money::from_major(650.0)));
    assert_eq!(order.estimated_amount(), Money::from_major(500.0));
    assert_eq!(order.timeline().len(), 3);
    assert_eq!(order.recycled_at(), Some(t0 + Duration::hours(3)));
    assert_eq!(order.accepted_at(), Some(t0 + Duration::hours(1)));

    let kinds: Vec<_> = order.timeline().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineKind::OrderCreated,
            TimelineKind::OrderAccepted,
            TimelineKind::OrderRecycled
        ]
    );
}

#[test]
fn every_step_sequence_respects_the_state_machine() {
    let steps = [Step::Accept, Step::Complete, Step::Cancel, Step::Reschedule];

    // All sequences of length four over the four steps.
    for a in steps {
        for b in steps {
            for c in steps {
                for d in steps {
                    let collector = CollectorId::new();
                    let (mut order, _) =
                        Order::create(OrderId::new(), RequesterId::new(), create_cmd(), Utc::now())
                            .unwrap();
                    let mut successes = 0;
                    let mut last_rank = rank(order.status());

                    for step in [a, b, c, d] {
                        let before = order.status();
                        if try_step(&mut order, step, collector) {
                            successes += 1;
                        }
                        let after = order.status();
                        assert!(rank(after) >= last_rank, "{before} -> {after}");
                        assert!(
                            !(before == OrderStatus::Pending && after == OrderStatus::Recycled),
                            "pending order was recycled directly"
                        );
                        if before.is_terminal() {
                            assert_eq!(before, after);
                        }
                        last_rank = rank(after);
                    }

                    assert_eq!(order.timeline().len(), 1 + successes);
                    assert_eq!(
                        order.collector_id().is_none(),
                        order.status() == OrderStatus::Pending
                            || (order.status() == OrderStatus::Cancelled
                                && order.accepted_at().is_none())
                    );
                    assert_eq!(
                        order.total_amount().is_some(),
                        order.status() == OrderStatus::Recycled
                    );
                }
            }
        }
    }
}

#[test]
fn timeline_timestamps_never_go_backwards() {
    let collector = CollectorId::new();
    let (mut order, _) =
        Order::create(OrderId::new(), RequesterId::new(), create_cmd(), Utc::now()).unwrap();

    for step in [Step::Reschedule, Step::Accept, Step::Reschedule, Step::Complete] {
        assert!(try_step(&mut order, step, collector));
    }

    let stamps: Vec<_> = order.timeline().iter().map(|e| e.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(order.updated_at(), *stamps.last().unwrap());
}

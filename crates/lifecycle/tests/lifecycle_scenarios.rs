//! End-to-end scenarios for the order lifecycle engine.

use std::sync::Arc;

use chrono::NaiveDate;
use collaborators::{
    InMemoryIdentityStore, InMemoryImageStore, InMemoryNotificationStore, Notification,
    NotificationDispatcher, NotificationKind, NotificationSink,
};
use common::{AdminId, Caller, CollectorId, Money, RequesterId, ScrapTypeId};
use domain::{
    CompleteOrder, CreateOrder, FeedbackUpdate, LineItem, Order, OrderStatus, PickupLocation,
    RescheduleOrder, TimelineKind,
};
use futures_util::future::join_all;
use lifecycle::{ErrorKind, FeedbackService, OrderService};
use order_store::{FeedbackRepository, InMemoryStore, OrderRepository};
use uuid::Uuid;

struct TestHarness {
    service: Arc<OrderService<InMemoryStore>>,
    store: InMemoryStore,
    images: Arc<InMemoryImageStore>,
    sink: Arc<InMemoryNotificationStore>,
    notifier: NotificationDispatcher,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let images = Arc::new(InMemoryImageStore::new());
        let identity = Arc::new(InMemoryIdentityStore::new());
        let sink = Arc::new(InMemoryNotificationStore::new());
        let (notifier, _worker) = NotificationDispatcher::spawn(sink.clone());

        let service = OrderService::new(store.clone(), images.clone(), identity, notifier.clone());

        Self {
            service: Arc::new(service),
            store,
            images,
            sink,
            notifier,
        }
    }

    async fn place_order(&self, requester: RequesterId) -> Order {
        self.service
            .create_order(Caller::Requester(requester), create_cmd())
            .await
            .unwrap()
    }

    async fn inbox(&self, target: Uuid) -> Vec<Notification> {
        self.notifier.flush().await;
        self.sink.list_for(target).await.unwrap()
    }
}

fn create_cmd() -> CreateOrder {
    CreateOrder {
        pickup_location: PickupLocation::new("Thamel, Kathmandu", 27.715, 85.312),
        pickup_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        pickup_time: "09:00-11:00".into(),
        contact_number: "9841234567".into(),
        line_items: vec![
            LineItem::new(ScrapTypeId::new(), 20.0, 300.0),
            LineItem::new(ScrapTypeId::new(), 8.0, 200.0),
        ],
        estimated_amount: Money::from_major(500.0),
        images: vec!["pile.jpg".into()],
    }
}

fn actuals() -> CompleteOrder {
    CompleteOrder::new(vec![
        LineItem::new(ScrapTypeId::new(), 24.5, 400.0),
        LineItem::new(ScrapTypeId::new(), 9.25, 250.0),
    ])
}

#[tokio::test]
async fn create_accept_complete_happy_path() {
    let h = TestHarness::new();
    let requester = RequesterId::new();
    let collector = CollectorId::new();

    let order = h.place_order(requester).await;
    assert_eq!(order.estimated_amount(), Money::from_major(500.0));
    assert_eq!(order.timeline().len(), 1);

    let order = h
        .service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();
    assert_eq!(order.timeline().len(), 2);

    let order = h
        .service
        .complete_order(Caller::Collector(collector), order.id(), actuals())
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::Recycled);
    assert_eq!(order.total_amount(), Some(Money::from_minor(65_000)));
    assert_eq!(order.total_amount().unwrap().to_string(), "650.00");
    assert_eq!(order.line_items().len(), 2);
    let kinds: Vec<_> = order.timeline().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineKind::OrderCreated,
            TimelineKind::OrderAccepted,
            TimelineKind::OrderRecycled
        ]
    );
    assert!(
        order
            .timeline()
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp)
    );

    let requester_inbox = h.inbox(requester.as_uuid()).await;
    let mut kinds: Vec<_> = requester_inbox.iter().map(|n| n.kind).collect();
    kinds.reverse();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::OrderPlaced,
            NotificationKind::OrderAccepted,
            NotificationKind::OrderRecycled
        ]
    );

    let collector_inbox = h.inbox(collector.as_uuid()).await;
    assert_eq!(collector_inbox.len(), 1);
    assert_eq!(collector_inbox[0].kind, NotificationKind::OrderRecycled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_have_exactly_one_winner() {
    let h = TestHarness::new();
    let order = h.place_order(RequesterId::new()).await;

    let attempts = (0..8).map(|_| {
        let service = h.service.clone();
        let order_id = order.id();
        tokio::spawn(async move {
            service
                .accept_order(Caller::Collector(CollectorId::new()), order_id)
                .await
        })
    });
    let results = join_all(attempts).await;

    let mut winners = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::InvalidState),
        }
    }
    assert_eq!(winners, 1);

    let stored = h.store.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Accepted);
    assert_eq!(stored.timeline().len(), 2);
}

#[tokio::test]
async fn failed_upload_persists_nothing() {
    let h = TestHarness::new();
    h.images.set_fail_on_store(true);
    let requester = RequesterId::new();

    let err = h
        .service
        .create_order(Caller::Requester(requester), create_cmd())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upload);
    assert_eq!(h.store.order_count().await, 0);
    assert!(h.inbox(requester.as_uuid()).await.is_empty());
}

#[tokio::test]
async fn sink_failure_does_not_fail_transitions() {
    let h = TestHarness::new();
    h.sink.set_fail_on_deliver(true);
    let requester = RequesterId::new();

    let order = h.place_order(requester).await;
    let accepted = h
        .service
        .accept_order(Caller::Collector(CollectorId::new()), order.id())
        .await
        .unwrap();

    assert_eq!(accepted.status(), OrderStatus::Accepted);
    assert!(h.inbox(requester.as_uuid()).await.is_empty());
}

#[tokio::test]
async fn cancel_then_accept_is_invalid_state() {
    let h = TestHarness::new();
    let requester = RequesterId::new();
    let order = h.place_order(requester).await;

    let cancelled = h
        .service
        .cancel_order(Caller::Requester(requester), order.id())
        .await
        .unwrap();
    assert_eq!(cancelled.status(), OrderStatus::Cancelled);

    let err = h
        .service
        .accept_order(Caller::Collector(CollectorId::new()), order.id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[tokio::test]
async fn cancelling_accepted_order_notifies_collector() {
    let h = TestHarness::new();
    let requester = RequesterId::new();
    let collector = CollectorId::new();
    let order = h.place_order(requester).await;
    h.service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();

    let err = h
        .service
        .cancel_order(Caller::Requester(RequesterId::new()), order.id())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    h.service
        .cancel_order(Caller::Requester(requester), order.id())
        .await
        .unwrap();

    let inbox = h.inbox(collector.as_uuid()).await;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationKind::OrderCancelled);
}

#[tokio::test]
async fn recycled_orders_are_closed() {
    let h = TestHarness::new();
    let requester = RequesterId::new();
    let collector = CollectorId::new();
    let order = h.place_order(requester).await;
    h.service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();
    h.service
        .complete_order(Caller::Collector(collector), order.id(), actuals())
        .await
        .unwrap();

    let cancel = h
        .service
        .cancel_order(Caller::Requester(requester), order.id())
        .await
        .unwrap_err();
    assert_eq!(cancel.kind(), ErrorKind::InvalidState);

    let reschedule = h
        .service
        .reschedule_order(
            Caller::Requester(requester),
            order.id(),
            RescheduleOrder::new(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(), "evening"),
        )
        .await
        .unwrap_err();
    assert_eq!(reschedule.kind(), ErrorKind::InvalidState);

    let again = h
        .service
        .complete_order(Caller::Collector(collector), order.id(), actuals())
        .await
        .unwrap_err();
    assert_eq!(again.kind(), ErrorKind::InvalidState);

    let stored = h.store.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(stored.timeline().len(), 3);
}

#[tokio::test]
async fn zero_total_completion_is_rejected() {
    let h = TestHarness::new();
    let collector = CollectorId::new();
    let order = h.place_order(RequesterId::new()).await;
    h.service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();

    let err = h
        .service
        .complete_order(
            Caller::Collector(collector),
            order.id(),
            CompleteOrder::new(vec![LineItem::new(ScrapTypeId::new(), 1.0, 0.001)]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let stored = h.store.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Accepted);
}

#[tokio::test]
async fn reschedule_moves_slot_and_notifies_both_parties() {
    let h = TestHarness::new();
    let requester = RequesterId::new();
    let collector = CollectorId::new();
    let order = h.place_order(requester).await;
    h.service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();

    let new_date = NaiveDate::from_ymd_opt(2025, 3, 18).unwrap();
    let order = h
        .service
        .reschedule_order(
            Caller::Requester(requester),
            order.id(),
            RescheduleOrder::new(new_date, "14:00-16:00"),
        )
        .await
        .unwrap();

    assert_eq!(order.pickup_date(), new_date);
    assert_eq!(order.pickup_time(), "14:00-16:00");
    assert_eq!(order.status(), OrderStatus::Accepted);
    assert_eq!(order.timeline().len(), 3);

    let inbox = h.inbox(collector.as_uuid()).await;
    assert_eq!(inbox[0].kind, NotificationKind::OrderRescheduled);
    assert!(inbox[0].message.contains("2025-03-18 (14:00-16:00)"));
}

#[tokio::test]
async fn feedback_survives_lifecycle_and_delete_detaches() {
    let h = TestHarness::new();
    let feedback = FeedbackService::new(h.store.clone());
    let requester = RequesterId::new();
    let collector = CollectorId::new();

    let order = h.place_order(requester).await;
    h.service
        .accept_order(Caller::Collector(collector), order.id())
        .await
        .unwrap();
    h.service
        .complete_order(Caller::Collector(collector), order.id(), actuals())
        .await
        .unwrap();

    let record = feedback
        .upsert(
            Caller::Collector(collector),
            order.id(),
            FeedbackUpdate::new(Some(5), Some("well sorted")),
        )
        .await
        .unwrap();
    let linked = h.store.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(linked.feedback_id(), Some(record.id));

    feedback
        .delete(Caller::Admin(AdminId::new()), record.id)
        .await
        .unwrap();

    let after = h.store.get_by_id(order.id()).await.unwrap().unwrap();
    assert_eq!(after.feedback_id(), None);
    assert_eq!(after.status(), OrderStatus::Recycled);
    assert!(h.store.get(record.id).await.unwrap().is_none());
}

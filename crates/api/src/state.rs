//! Shared application state.

use std::sync::Arc;

use collaborators::{
    IdentityStore, ImageStore, InMemoryIdentityStore, InMemoryImageStore, InMemoryNotificationStore,
    InMemoryScrapCatalog, NotificationDispatcher, NotificationSink, ScrapCatalog,
};
use common::Money;
use lifecycle::{FeedbackService, OrderService};
use order_store::{FeedbackRepository, OrderRepository};
use queries::{AnalyticsEngine, GeoQueryEngine, OrderQueries};

use crate::config::Config;

/// Storage the server can run on.
pub trait AppStore: OrderRepository + FeedbackRepository + Clone + 'static {}

impl<T> AppStore for T where T: OrderRepository + FeedbackRepository + Clone + 'static {}

/// The external collaborators the server talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub identity: Arc<dyn IdentityStore>,
    pub images: Arc<dyn ImageStore>,
    pub catalog: Arc<dyn ScrapCatalog>,
    pub sink: Arc<dyn NotificationSink>,
}

impl Collaborators {
    /// In-memory collaborators, with the configured tokens registered.
    pub async fn in_memory(config: &Config) -> Self {
        let identity = InMemoryIdentityStore::new();
        for (token, caller) in &config.identity_tokens {
            identity.register(token.clone(), *caller, None).await;
        }
        if config.identity_tokens.is_empty() {
            tracing::warn!("no identity tokens configured, every request will be unauthorized");
        }

        Self {
            identity: Arc::new(identity),
            images: Arc::new(InMemoryImageStore::new()),
            catalog: Arc::new(InMemoryScrapCatalog::new()),
            sink: Arc::new(InMemoryNotificationStore::new()),
        }
    }
}

/// Shared application state accessible from all handlers.
pub struct AppState<S: AppStore> {
    pub orders: OrderService<S>,
    pub feedback: FeedbackService<S>,
    pub geo: GeoQueryEngine<S>,
    pub analytics: AnalyticsEngine<S>,
    pub lists: OrderQueries<S>,
    pub identity: Arc<dyn IdentityStore>,
    pub notifications: Arc<dyn NotificationSink>,
    pub notifier: NotificationDispatcher,
    pub config: Config,
}

impl<S: AppStore> AppState<S> {
    /// Wires the engines over one store and starts the notification worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: S, collaborators: Collaborators, config: Config) -> Self {
        let (notifier, _worker) = NotificationDispatcher::spawn(collaborators.sink.clone());

        Self {
            orders: OrderService::new(
                store.clone(),
                collaborators.images,
                collaborators.identity.clone(),
                notifier.clone(),
            ),
            feedback: FeedbackService::new(store.clone()),
            geo: GeoQueryEngine::new(
                store.clone(),
                collaborators.identity.clone(),
                collaborators.catalog,
            ),
            analytics: AnalyticsEngine::new(store.clone(), collaborators.identity.clone()),
            lists: OrderQueries::new(store),
            identity: collaborators.identity,
            notifications: collaborators.sink,
            notifier,
            config,
        }
    }

    /// Threshold of the high-value list when the request gives none.
    pub fn high_value_threshold(&self) -> Money {
        Money::from_major(self.config.high_value_threshold)
    }
}

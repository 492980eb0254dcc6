//! HTTP API server with observability for the scrap-collection order service.
//!
//! Provides REST endpoints for the order lifecycle, nearby search, analytics,
//! feedback and notifications, with structured logging (tracing) and
//! Prometheus metrics. Callers authenticate with a bearer token resolved by
//! the identity store.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use state::{AppState, AppStore, Collaborators};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: AppStore>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router {
    use routes::{analytics, dashboard, feedback, health, metrics, notifications, orders};

    let metrics_router = Router::new()
        .route("/metrics", get(metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(health::check))
        .route("/orders", post(orders::create::<S>))
        .route("/orders/my-orders", get(orders::my_orders::<S>))
        .route("/orders/collector/history", get(orders::collector_history::<S>))
        .route("/orders/collector/active", get(orders::collector_active::<S>))
        .route("/orders/nearby", get(orders::nearby::<S>))
        .route("/orders/pending", get(orders::pending::<S>))
        .route("/orders/today", get(orders::today::<S>))
        .route("/orders/high-value", get(orders::high_value::<S>))
        .route("/orders/{id}", get(orders::get::<S>))
        .route("/orders/{id}/accept", patch(orders::accept::<S>))
        .route("/orders/{id}/complete", patch(orders::complete::<S>))
        .route("/orders/{id}/cancel", patch(orders::cancel::<S>))
        .route("/orders/{id}/reschedule", patch(orders::reschedule::<S>))
        .route("/dashboard/user-stats", get(dashboard::user_stats::<S>))
        .route("/dashboard/collector-stats", get(dashboard::collector_stats::<S>))
        .route("/dashboard/admin-stats", get(dashboard::admin_stats::<S>))
        .route(
            "/dashboard/collection-overview",
            get(dashboard::collection_overview::<S>),
        )
        .route("/analytics/top-requesters", get(analytics::top_requesters::<S>))
        .route("/analytics/top-collectors", get(analytics::top_collectors::<S>))
        .route("/feedback", get(feedback::list::<S>))
        .route(
            "/feedback/order/{order_id}",
            put(feedback::upsert::<S>).get(feedback::by_order::<S>),
        )
        .route(
            "/feedback/{id}",
            get(feedback::get::<S>).delete(feedback::delete::<S>),
        )
        .route("/notifications", get(notifications::list::<S>))
        .route("/notifications/{id}", delete(notifications::delete::<S>))
        .route("/notifications/{id}/read", patch(notifications::mark_read::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over `store` with in-memory collaborators.
///
/// Must be called from within a tokio runtime.
pub async fn create_default_state<S: AppStore>(store: S, config: Config) -> Arc<AppState<S>> {
    let collaborators = Collaborators::in_memory(&config).await;
    Arc::new(AppState::new(store, collaborators, config))
}

//! Analytics over the order collection.
//!
//! Every figure is recomputed from the repository on each call. The pure
//! functions in the submodules do the arithmetic; [`AnalyticsEngine`] loads
//! the orders, attaches profiles and records query timings.

mod dashboard;
mod leaderboard;
mod stats;

pub use dashboard::{
    DashboardStats, MonthlyCollection, OVERVIEW_MONTHS, collection_overview, dashboard_stats,
    percentage_change,
};
pub use leaderboard::{
    CollectorRanking, LEADERBOARD_SIZE, RequesterRanking, top_collectors, top_requesters,
};
pub use stats::{EnvironmentalImpact, ParticipantStats};

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, TimeZone};
use collaborators::{IdentityStore, Profile};
use common::{Caller, CollectorId, RequesterId};
use domain::{Order, OrderStatus};
use order_store::{OrderQuery, OrderRepository};

use crate::error::{QueryError, Result};

/// Read-only analytics engine.
pub struct AnalyticsEngine<S: OrderRepository> {
    store: S,
    identity: Arc<dyn IdentityStore>,
}

impl<S: OrderRepository> AnalyticsEngine<S> {
    pub fn new(store: S, identity: Arc<dyn IdentityStore>) -> Self {
        Self { store, identity }
    }

    /// Totals over a requester's recycled orders.
    #[tracing::instrument(skip(self))]
    pub async fn requester_stats(&self, requester_id: RequesterId) -> Result<ParticipantStats> {
        let start = Instant::now();
        let orders = self
            .store
            .find(OrderQuery::for_requester(requester_id).status(OrderStatus::Recycled))
            .await?;
        let profile = self.profile(Caller::Requester(requester_id)).await;

        let stats = ParticipantStats::from_orders(&orders, profile);
        record_duration("requester_stats", start);
        Ok(stats)
    }

    /// Totals over a collector's recycled orders.
    #[tracing::instrument(skip(self))]
    pub async fn collector_stats(&self, collector_id: CollectorId) -> Result<ParticipantStats> {
        let start = Instant::now();
        let orders = self
            .store
            .find(OrderQuery::for_collector(collector_id).status(OrderStatus::Recycled))
            .await?;
        let profile = self.profile(Caller::Collector(collector_id)).await;

        let stats = ParticipantStats::from_orders(&orders, profile);
        record_duration("collector_stats", start);
        Ok(stats)
    }

    /// Admin dashboard as of `now`.
    pub async fn dashboard<Tz>(&self, now: DateTime<Tz>) -> Result<DashboardStats>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let start = Instant::now();
        let orders = self.all_orders().await?;
        let stats = dashboard_stats(&orders, &now);
        record_duration("dashboard", start);
        tracing::debug!(scanned = orders.len(), "dashboard computed");
        Ok(stats)
    }

    /// Six-month recycled weight overview ending at the month of `now`.
    pub async fn collection_overview<Tz>(&self, now: DateTime<Tz>) -> Result<Vec<MonthlyCollection>>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let start = Instant::now();
        let orders = self.all_orders().await?;
        let overview = collection_overview(&orders, &now);
        record_duration("collection_overview", start);
        Ok(overview)
    }

    /// Top requesters by recycled amount.
    #[tracing::instrument(skip(self))]
    pub async fn top_requesters(&self) -> Result<Vec<RequesterRanking>> {
        let start = Instant::now();
        let orders = self.all_orders().await?;
        let ranked = top_requesters(&orders);
        if ranked.is_empty() {
            return Err(QueryError::NoData("no recycled orders to rank requesters by"));
        }

        let mut board = Vec::with_capacity(ranked.len());
        for (requester_id, total_amount, order_count) in ranked {
            board.push(RequesterRanking {
                requester_id,
                profile: self.profile(Caller::Requester(requester_id)).await,
                total_amount,
                order_count,
            });
        }
        record_duration("top_requesters", start);
        Ok(board)
    }

    /// Top collectors by recycled weight.
    #[tracing::instrument(skip(self))]
    pub async fn top_collectors(&self) -> Result<Vec<CollectorRanking>> {
        let start = Instant::now();
        let orders = self.all_orders().await?;
        let ranked = top_collectors(&orders);
        if ranked.is_empty() {
            return Err(QueryError::NoData("no recycled orders to rank collectors by"));
        }

        let mut board = Vec::with_capacity(ranked.len());
        for (collector_id, total_weight_kg, order_count) in ranked {
            board.push(CollectorRanking {
                collector_id,
                profile: self.profile(Caller::Collector(collector_id)).await,
                total_weight_kg,
                order_count,
            });
        }
        record_duration("top_collectors", start);
        Ok(board)
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        Ok(self.store.find(OrderQuery::new()).await?)
    }

    async fn profile(&self, caller: Caller) -> Option<Profile> {
        match self.identity.profile(caller).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(%caller, error = %e, "profile lookup failed");
                None
            }
        }
    }
}

fn record_duration(query: &'static str, start: Instant) {
    let duration = start.elapsed().as_secs_f64();
    metrics::histogram!("analytics_query_duration_seconds", "query" => query).record(duration);
}

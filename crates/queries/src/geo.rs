//! Distance-ranked nearby orders for collectors.

use std::collections::HashMap;
use std::sync::Arc;

use collaborators::{IdentityStore, ScrapCatalog, ScrapInfo};
use common::{Caller, GeoPoint, Money, RequesterId, ScrapTypeId};
use domain::{Order, OrderStatus};
use order_store::{OrderQuery, OrderRepository};
use serde::Serialize;

use crate::error::{QueryError, Result};

/// Search radius used when the caller gives none.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Parameters of a nearby search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbyQuery {
    pub origin: GeoPoint,
    pub radius_km: f64,
    pub status: OrderStatus,
    pub unassigned_only: bool,
}

impl NearbyQuery {
    /// Pending, unassigned orders within the default radius.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            origin: GeoPoint::new(latitude, longitude),
            radius_km: DEFAULT_RADIUS_KM,
            status: OrderStatus::Pending,
            unassigned_only: true,
        }
    }

    pub fn radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn include_assigned(mut self) -> Self {
        self.unassigned_only = false;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.origin.is_valid() {
            return Err(QueryError::Validation(format!(
                "coordinates ({}, {}) are out of range",
                self.origin.latitude, self.origin.longitude
            )));
        }
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(QueryError::Validation(format!(
                "radius {} km is not a non-negative number",
                self.radius_km
            )));
        }
        Ok(())
    }
}

/// Contact details of the requester shown to a collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequesterSummary {
    pub full_name: String,
    pub phone: String,
}

/// A line item with its catalog entry, when the catalog knows the scrap type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedLineItem {
    pub scrap_type_id: ScrapTypeId,
    pub weight_kg: f64,
    pub amount: f64,
    pub name: Option<String>,
    pub price_per_kg: Option<Money>,
}

/// One search hit.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyOrder {
    pub order: Order,
    pub distance_km: f64,
    pub requester: Option<RequesterSummary>,
    pub line_items: Vec<EnrichedLineItem>,
}

/// Keeps orders within `radius_km` of `origin`, nearest first.
///
/// Equal distances put the most recently created order first.
pub fn rank_by_distance(origin: GeoPoint, radius_km: f64, orders: Vec<Order>) -> Vec<(Order, f64)> {
    let mut ranked: Vec<(Order, f64)> = orders
        .into_iter()
        .map(|order| {
            let distance = origin.distance_km(&order.pickup_location().point());
            (order, distance)
        })
        .filter(|(_, distance)| *distance <= radius_km)
        .collect();

    ranked.sort_by(|(a, da), (b, db)| {
        da.total_cmp(db)
            .then_with(|| b.created_at().cmp(&a.created_at()))
    });
    ranked
}

/// Geo-query engine over the order repository.
pub struct GeoQueryEngine<S: OrderRepository> {
    store: S,
    identity: Arc<dyn IdentityStore>,
    catalog: Arc<dyn ScrapCatalog>,
}

impl<S: OrderRepository> GeoQueryEngine<S> {
    pub fn new(store: S, identity: Arc<dyn IdentityStore>, catalog: Arc<dyn ScrapCatalog>) -> Self {
        Self {
            store,
            identity,
            catalog,
        }
    }

    /// Finds orders near a point, enriched with requester contact details
    /// and scrap catalog entries.
    #[tracing::instrument(skip(self))]
    pub async fn find_nearby(&self, query: NearbyQuery) -> Result<Vec<NearbyOrder>> {
        query.validate()?;
        metrics::counter!("nearby_queries_total").increment(1);

        let mut filter = OrderQuery::new().status(query.status);
        if query.unassigned_only {
            filter = filter.unassigned();
        }
        let candidates = self.store.find(filter).await?;
        let ranked = rank_by_distance(query.origin, query.radius_km, candidates);

        let mut requesters: HashMap<RequesterId, Option<RequesterSummary>> = HashMap::new();
        let mut scraps: HashMap<ScrapTypeId, Option<ScrapInfo>> = HashMap::new();
        let mut results = Vec::with_capacity(ranked.len());

        for (order, distance_km) in ranked {
            let requester_id = order.requester_id();
            if !requesters.contains_key(&requester_id) {
                let summary = self.requester_summary(requester_id).await;
                requesters.insert(requester_id, summary);
            }

            let mut line_items = Vec::with_capacity(order.line_items().len());
            for item in order.line_items() {
                if !scraps.contains_key(&item.scrap_type_id) {
                    let info = self.scrap_info(item.scrap_type_id).await;
                    scraps.insert(item.scrap_type_id, info);
                }
                let info = scraps.get(&item.scrap_type_id).cloned().flatten();
                line_items.push(EnrichedLineItem {
                    scrap_type_id: item.scrap_type_id,
                    weight_kg: item.weight_kg,
                    amount: item.amount,
                    name: info.as_ref().map(|i| i.name.clone()),
                    price_per_kg: info.map(|i| i.price_per_kg),
                });
            }

            results.push(NearbyOrder {
                requester: requesters.get(&requester_id).cloned().flatten(),
                order,
                distance_km,
                line_items,
            });
        }

        tracing::debug!(hits = results.len(), "nearby search finished");
        Ok(results)
    }

    async fn requester_summary(&self, id: RequesterId) -> Option<RequesterSummary> {
        match self.identity.profile(Caller::Requester(id)).await {
            Ok(profile) => profile.map(|p| RequesterSummary {
                full_name: p.full_name,
                phone: p.phone,
            }),
            Err(e) => {
                tracing::warn!(requester_id = %id, error = %e, "requester lookup failed");
                None
            }
        }
    }

    async fn scrap_info(&self, id: ScrapTypeId) -> Option<ScrapInfo> {
        match self.catalog.scrap(id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(scrap_type_id = %id, error = %e, "scrap catalog lookup failed");
                None
            }
        }
    }
}

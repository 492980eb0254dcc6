//! Read side of the scrap-collection order service.
//!
//! This crate provides:
//! - [`GeoQueryEngine`] for distance-ranked nearby orders
//! - [`AnalyticsEngine`] for per-identity stats, the admin dashboard, the
//!   collection overview and leaderboards
//! - [`OrderQueries`] for the canned requester and collector order lists
//!
//! Nothing is cached; every call reads the order repository.

pub mod analytics;
pub mod error;
pub mod geo;
pub mod orders;

pub use analytics::{
    AnalyticsEngine, CollectorRanking, DashboardStats, EnvironmentalImpact, MonthlyCollection,
    ParticipantStats, RequesterRanking,
};
pub use error::{QueryError, Result};
pub use geo::{
    DEFAULT_RADIUS_KM, EnrichedLineItem, GeoQueryEngine, NearbyOrder, NearbyQuery,
    RequesterSummary, rank_by_distance,
};
pub use orders::{DEFAULT_HIGH_VALUE_THRESHOLD, OrderQueries};

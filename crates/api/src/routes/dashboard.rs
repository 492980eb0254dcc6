//! Per-identity stats and admin dashboard endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Local;
use queries::{DashboardStats, MonthlyCollection, ParticipantStats};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::{AppState, AppStore};

/// GET /dashboard/user-stats: the requester's own totals.
pub async fn user_stats<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<ParticipantStats>, ApiError> {
    let requester = auth.requester()?;
    Ok(Json(state.analytics.requester_stats(requester).await?))
}

/// GET /dashboard/collector-stats: the collector's own totals.
pub async fn collector_stats<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<ParticipantStats>, ApiError> {
    let collector = auth.collector()?;
    Ok(Json(state.analytics.collector_stats(collector).await?))
}

/// GET /dashboard/admin-stats
///
/// Day and week boundaries follow the server's local timezone.
pub async fn admin_stats<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<DashboardStats>, ApiError> {
    auth.admin()?;
    Ok(Json(state.analytics.dashboard(Local::now()).await?))
}

/// GET /dashboard/collection-overview: recycled weight for the last six months.
pub async fn collection_overview<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<MonthlyCollection>>, ApiError> {
    auth.admin()?;
    Ok(Json(state.analytics.collection_overview(Local::now()).await?))
}

//! Leaderboard endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use queries::{CollectorRanking, RequesterRanking};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::{AppState, AppStore};

/// GET /analytics/top-requesters
pub async fn top_requesters<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<RequesterRanking>>, ApiError> {
    auth.admin()?;
    Ok(Json(state.analytics.top_requesters().await?))
}

/// GET /analytics/top-collectors
pub async fn top_collectors<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<CollectorRanking>>, ApiError> {
    auth.admin()?;
    Ok(Json(state.analytics.top_collectors().await?))
}

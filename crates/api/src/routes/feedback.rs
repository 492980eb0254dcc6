//! Order feedback endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{CollectorId, FeedbackId, RequesterId};
use domain::{Feedback, FeedbackUpdate};
use serde::Deserialize;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::routes::orders::parse_order_id;
use crate::state::{AppState, AppStore};

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackFilter {
    pub collector_id: Option<CollectorId>,
    pub requester_id: Option<RequesterId>,
}

fn parse_feedback_id(id: &str) -> Result<FeedbackId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid feedback id: {e}")))
}

/// PUT /feedback/order/{order_id}: write the caller's side of the feedback.
#[tracing::instrument(skip(state, update), fields(caller = %caller))]
pub async fn upsert<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(order_id): Path<String>,
    Json(update): Json<FeedbackUpdate>,
) -> Result<Json<Feedback>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    Ok(Json(state.feedback.upsert(caller, order_id, update).await?))
}

/// GET /feedback/order/{order_id}
pub async fn by_order<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(order_id): Path<String>,
) -> Result<Json<Feedback>, ApiError> {
    let order_id = parse_order_id(&order_id)?;
    state
        .feedback
        .get_by_order(caller, order_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No feedback for order {order_id}")))
}

/// GET /feedback: every record, or one party's with `collector_id` or
/// `requester_id`. Admin only.
pub async fn list<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Query(filter): Query<FeedbackFilter>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let records = match filter {
        FeedbackFilter {
            collector_id: Some(_),
            requester_id: Some(_),
        } => {
            return Err(ApiError::BadRequest(
                "filter by collector_id or requester_id, not both".to_string(),
            ));
        }
        FeedbackFilter {
            collector_id: Some(id),
            ..
        } => state.feedback.list_for_collector(caller, id).await?,
        FeedbackFilter {
            requester_id: Some(id),
            ..
        } => state.feedback.list_for_requester(caller, id).await?,
        _ => state.feedback.list_all(caller).await?,
    };
    Ok(Json(records))
}

/// GET /feedback/{id}
pub async fn get<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<Feedback>, ApiError> {
    let id = parse_feedback_id(&id)?;
    Ok(Json(state.feedback.get(caller, id).await?))
}

/// DELETE /feedback/{id}: admin only; the order keeps its status.
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn delete<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<Feedback>, ApiError> {
    let id = parse_feedback_id(&id)?;
    Ok(Json(state.feedback.delete(caller, id).await?))
}

//! In-app notification inbox endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use collaborators::Notification;
use common::NotificationId;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::{AppState, AppStore};

/// GET /notifications: the caller's notifications, newest first.
pub async fn list<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifications.list_for(caller.id()).await?))
}

/// PATCH /notifications/{id}/read
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn mark_read<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let id = parse_notification_id(&id)?;

    state
        .notifications
        .mark_read(id, caller.id())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Notification {id} not found")))
}

/// DELETE /notifications/{id}
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn delete<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let id = parse_notification_id(&id)?;

    let removed = state
        .notifications
        .delete(id, caller.id())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Notification {id} not found")))?;
    tracing::info!(notification_id = %id, "notification deleted");
    Ok(Json(removed))
}

fn parse_notification_id(id: &str) -> Result<NotificationId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid notification id: {e}")))
}

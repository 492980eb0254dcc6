//! Bearer-token authentication.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::{AdminId, Caller, CollectorId, RequesterId};

use crate::error::ApiError;
use crate::state::{AppState, AppStore};

/// The caller behind the request's `Authorization: Bearer` token.
#[derive(Debug, Clone, Copy)]
pub struct Auth(pub Caller);

impl Auth {
    pub fn requester(&self) -> Result<RequesterId, ApiError> {
        self.0
            .as_requester()
            .ok_or_else(|| role_required("requester", self.0))
    }

    pub fn collector(&self) -> Result<CollectorId, ApiError> {
        self.0
            .as_collector()
            .ok_or_else(|| role_required("collector", self.0))
    }

    pub fn admin(&self) -> Result<AdminId, ApiError> {
        match self.0 {
            Caller::Admin(id) => Ok(id),
            other => Err(role_required("admin", other)),
        }
    }
}

fn role_required(role: &str, caller: Caller) -> ApiError {
    ApiError::Forbidden(format!("{role} role required, caller is a {}", caller.role()))
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid Authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("expected a Bearer token".to_string()))
}

impl<S: AppStore> FromRequestParts<Arc<AppState<S>>> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let caller = state.identity.verify_caller(token).await?;
        tracing::debug!(%caller, "request authenticated");
        Ok(Auth(caller))
    }
}

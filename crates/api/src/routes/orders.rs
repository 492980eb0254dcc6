//! Order lifecycle and order list endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Local, NaiveDate, Utc};
use common::{Money, OrderId};
use domain::{
    Aggregate, CompleteOrder, CreateOrder, LineItem, Order, PickupLocation, RescheduleOrder,
    TimelineEntry,
};
use queries::{EnrichedLineItem, NearbyOrder, NearbyQuery, RequesterSummary};
use serde::{Deserialize, Serialize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::state::{AppState, AppStore};

// -- Request types --

/// Body of `POST /orders`.
///
/// Every field is optional on the wire so an absent one is reported as a
/// validation error naming the field.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    pub pickup_location: Option<PickupLocation>,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time: Option<String>,
    pub contact_number: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub estimated_amount: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CreateOrderRequest {
    fn into_command(self) -> Result<CreateOrder, ApiError> {
        Ok(CreateOrder {
            pickup_location: self.pickup_location.ok_or_else(|| missing("pickup_location"))?,
            pickup_date: self.pickup_date.ok_or_else(|| missing("pickup_date"))?,
            pickup_time: self.pickup_time.unwrap_or_default(),
            contact_number: self.contact_number.ok_or_else(|| missing("contact_number"))?,
            line_items: self.line_items,
            estimated_amount: estimated_amount(self.estimated_amount)?,
            images: self.images,
        })
    }
}

fn estimated_amount(value: Option<f64>) -> Result<Money, ApiError> {
    let major = value.ok_or_else(|| missing("estimated_amount"))?;
    Money::try_from_major(major).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "estimated_amount must be a finite number no larger than {}",
            Money::MAX_MAJOR
        ))
    })
}

fn missing(field: &str) -> ApiError {
    ApiError::BadRequest(format!("{field} is required"))
}

/// Body of `PATCH /orders/{id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteOrderRequest {
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct HighValueParams {
    pub min_amount: Option<f64>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub requester_id: String,
    pub collector_id: Option<String>,
    pub status: String,
    pub pickup_location: PickupLocation,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub contact_number: String,
    pub line_items: Vec<LineItem>,
    pub estimated_amount: Money,
    pub total_amount: Option<Money>,
    pub images: Vec<String>,
    pub feedback_id: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id(),
            requester_id: order.requester_id().to_string(),
            collector_id: order.collector_id().map(|c| c.to_string()),
            status: order.status().to_string(),
            pickup_location: order.pickup_location().clone(),
            pickup_date: order.pickup_date(),
            pickup_time: order.pickup_time().to_string(),
            contact_number: order.contact_number().to_string(),
            line_items: order.line_items().to_vec(),
            estimated_amount: order.estimated_amount(),
            total_amount: order.total_amount(),
            images: order.images().to_vec(),
            feedback_id: order.feedback_id().map(|f| f.to_string()),
            timeline: order.timeline().to_vec(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
            version: order.version().as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyOrderResponse {
    pub order: OrderResponse,
    pub distance_km: f64,
    pub requester: Option<RequesterSummary>,
    pub line_items: Vec<EnrichedLineItem>,
}

impl From<NearbyOrder> for NearbyOrderResponse {
    fn from(hit: NearbyOrder) -> Self {
        Self {
            order: hit.order.into(),
            distance_km: hit.distance_km,
            requester: hit.requester,
            line_items: hit.line_items,
        }
    }
}

fn order_list(orders: Vec<Order>) -> Json<Vec<OrderResponse>> {
    Json(orders.into_iter().map(OrderResponse::from).collect())
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))
}

// -- Lifecycle handlers --

/// POST /orders: place a pickup order.
#[tracing::instrument(skip(state, req), fields(caller = %caller))]
pub async fn create<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let cmd = req.into_command()?;
    let order = state.orders.create_order(caller, cmd).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /orders/{id}: load an order visible to the caller.
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn get<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.get_order(caller, order_id).await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/accept
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn accept<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.accept_order(caller, order_id).await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/complete
#[tracing::instrument(skip(state, req), fields(caller = %caller))]
pub async fn complete<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    Json(req): Json<CompleteOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .complete_order(caller, order_id, CompleteOrder::new(req.line_items))
        .await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/cancel
#[tracing::instrument(skip(state), fields(caller = %caller))]
pub async fn cancel<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.cancel_order(caller, order_id).await?;
    Ok(Json(order.into()))
}

/// PATCH /orders/{id}/reschedule
#[tracing::instrument(skip(state, req), fields(caller = %caller))]
pub async fn reschedule<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    Json(req): Json<RescheduleOrder>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orders.reschedule_order(caller, order_id, req).await?;
    Ok(Json(order.into()))
}

// -- List handlers --

/// GET /orders/my-orders: the requester's orders, newest first.
pub async fn my_orders<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let requester = auth.requester()?;
    Ok(order_list(state.lists.requester_history(requester).await?))
}

/// GET /orders/collector/history
pub async fn collector_history<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let collector = auth.collector()?;
    Ok(order_list(state.lists.collector_history(collector).await?))
}

/// GET /orders/collector/active
pub async fn collector_active<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let collector = auth.collector()?;
    Ok(order_list(state.lists.collector_active(collector).await?))
}

/// GET /orders/nearby?lat=&lon=&radius_km=
#[tracing::instrument(skip(state, auth))]
pub async fn nearby<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
    Query(params): Query<NearbyParams>,
) -> Result<Json<Vec<NearbyOrderResponse>>, ApiError> {
    auth.collector()?;
    let (Some(lat), Some(lon)) = (params.lat, params.lon) else {
        return Err(ApiError::BadRequest("lat and lon are required".to_string()));
    };
    let radius = params
        .radius_km
        .unwrap_or(state.config.nearby_default_radius_km);

    let hits = state
        .geo
        .find_nearby(NearbyQuery::new(lat, lon).radius_km(radius))
        .await?;
    Ok(Json(hits.into_iter().map(NearbyOrderResponse::from).collect()))
}

/// GET /orders/pending
pub async fn pending<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    auth.collector()?;
    Ok(order_list(state.lists.pending_orders().await?))
}

/// GET /orders/today: orders whose pickup falls on the server's local date.
pub async fn today<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    auth.collector()?;
    let today = Local::now().date_naive();
    Ok(order_list(state.lists.scheduled_for_day(today).await?))
}

/// GET /orders/high-value?min_amount=
pub async fn high_value<S: AppStore>(
    State(state): State<Arc<AppState<S>>>,
    auth: Auth,
    Query(params): Query<HighValueParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    auth.collector()?;
    let threshold = match params.min_amount {
        Some(amount) if amount.is_finite() && amount >= 0.0 => Money::from_major(amount),
        Some(amount) => {
            return Err(ApiError::BadRequest(format!(
                "min_amount {amount} is not a non-negative number"
            )));
        }
        None => state.high_value_threshold(),
    };
    Ok(order_list(state.lists.high_value_orders(threshold).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reports_first_missing_field() {
        let req: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "pickup_location": {
                "formatted_address": "Lalitpur",
                "latitude": 27.67,
                "longitude": 85.32
            },
            "contact_number": "9800000000"
        }))
        .unwrap();

        match req.into_command() {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "pickup_date is required"),
            other => panic!("expected a bad request, got {other:?}"),
        }
    }

    #[test]
    fn blank_pickup_time_is_left_to_the_command() {
        let req = CreateOrderRequest {
            pickup_location: Some(PickupLocation::new("Lalitpur", 27.67, 85.32)),
            pickup_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            contact_number: Some("9800000000".into()),
            estimated_amount: Some(120.0),
            ..Default::default()
        };

        let cmd = req.into_command().unwrap();
        assert!(cmd.validate().is_err());
        assert_eq!(cmd.estimated_amount, Money::from_major(120.0));
    }

    #[test]
    fn create_request_rejects_out_of_range_estimate() {
        let req = CreateOrderRequest {
            pickup_location: Some(PickupLocation::new("Lalitpur", 27.67, 85.32)),
            pickup_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            contact_number: Some("9800000000".into()),
            estimated_amount: Some(5e16),
            ..Default::default()
        };

        assert!(matches!(req.into_command(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn order_id_parsing() {
        let id = OrderId::new();
        assert_eq!(parse_order_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_order_id("not-a-uuid"), Err(ApiError::BadRequest(_))));
    }
}

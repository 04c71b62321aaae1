//! Subscription API handlers
//!
//! Contains HTTP request handlers for subscription CRUD operations and the
//! cost summary. Handlers decode and shape-check input, call the service,
//! and leave status mapping to `AppError`.

use crate::error::AppError;
use crate::subscriptions::{
    Subscription, SubscriptionFilter, SubscriptionRequest, SubscriptionService,
    SummaryCostResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
    /// Status indicator (e.g., "ok", "error")
    pub status: String,
}

/// Query parameters of the cost endpoint
///
/// Empty values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct CostQuery {
    /// Owning user, must parse as a UUID
    pub user_id: Option<String>,
    /// Exact service name
    pub service_name: Option<String>,
    /// `MM-YYYY` month
    pub period: Option<String>,
}

impl CostQuery {
    /// Convert raw query values into a filter
    ///
    /// # Returns
    /// * `Ok(SubscriptionFilter)` - with empty values dropped
    /// * `Err(AppError::BadRequest)` - `user_id` is not a UUID
    pub fn into_filter(self) -> Result<SubscriptionFilter, AppError> {
        let user_id = non_empty(self.user_id)
            .map(|raw| Uuid::parse_str(raw.trim()))
            .transpose()
            .map_err(|_| AppError::BadRequest("Invalid user_id format".to_string()))?;

        Ok(SubscriptionFilter {
            user_id,
            service_name: non_empty(self.service_name),
            period: non_empty(self.period),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parse a path id
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid subscription ID".to_string()))
}

/// Unwrap a JSON body and check its shape
fn decode_request(
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<SubscriptionRequest, AppError> {
    let Json(request) = payload
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    request.validate().map_err(AppError::BadRequest)?;
    Ok(request)
}

/// POST /api/v1/subscriptions - Create a subscription
pub async fn create_subscription(
    State(service): State<SubscriptionService>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let request = decode_request(payload)?;
    let subscription = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(subscription)))
}

/// GET /api/v1/subscriptions - List all subscriptions
pub async fn list_subscriptions(
    State(service): State<SubscriptionService>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    Ok(Json(service.get_all().await?))
}

/// GET /api/v1/subscriptions/:id - Get a specific subscription
pub async fn get_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
) -> Result<Json<Subscription>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(service.get_by_id(id).await?))
}

/// PUT /api/v1/subscriptions/:id - Replace a subscription's fields
pub async fn update_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionRequest>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let id = parse_id(&id)?;
    let request = decode_request(payload)?;
    Ok(Json(service.update(id, request).await?))
}

/// DELETE /api/v1/subscriptions/:id - Delete a subscription
pub async fn delete_subscription(
    State(service): State<SubscriptionService>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    service.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Subscription deleted successfully".to_string(),
        status: "ok".to_string(),
    }))
}

/// GET /api/v1/subscriptions/cost - Total cost over optional filters
pub async fn calculate_total_cost(
    State(service): State<SubscriptionService>,
    query: Result<Query<CostQuery>, QueryRejection>,
) -> Result<Json<SummaryCostResponse>, AppError> {
    let Query(query) =
        query.map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
    let filter = query.into_filter()?;
    Ok(Json(service.calculate_total_cost(filter).await?))
}

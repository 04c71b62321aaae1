//! API module
//!
//! Contains HTTP request handlers and the router that mounts them.

pub mod middleware;
pub mod subscriptions;

use crate::subscriptions::SubscriptionService;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Prefix of all versioned routes
pub const API_PREFIX: &str = "/api/v1";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process is serving
    pub status: String,
}

/// GET /health - Liveness check
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Routes served under `API_PREFIX`, paired with a short description
pub const ENDPOINTS: [(&str, &str); 6] = [
    ("POST /api/v1/subscriptions", "Create subscription"),
    ("GET /api/v1/subscriptions", "Get all subscriptions"),
    ("GET /api/v1/subscriptions/:id", "Get subscription by ID"),
    ("PUT /api/v1/subscriptions/:id", "Update subscription"),
    ("DELETE /api/v1/subscriptions/:id", "Delete subscription"),
    (
        "GET /api/v1/subscriptions/cost",
        "Calculate total cost with filters",
    ),
];

/// Build the application router around `service`
pub fn router(service: SubscriptionService) -> Router {
    let api = Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/cost",
            get(subscriptions::calculate_total_cost),
        )
        .route(
            "/subscriptions/:id",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest(API_PREFIX, api)
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(service)
}

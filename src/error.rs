//! Error types and error handling for the HTTP layer
//!
//! This module defines the error type returned by handlers and its
//! conversion to HTTP responses. Domain errors are wrapped, never rewritten.

use crate::subscriptions::SubscriptionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned to clients for any server-side failure
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error raised by the subscription service
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),

    /// Request could not be decoded (bad id, UUID or JSON body)
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Subscription(SubscriptionError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Subscription(SubscriptionError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Subscription(SubscriptionError::Storage(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_message = match &self {
            AppError::Subscription(SubscriptionError::NotFound(_)) => {
                "Subscription not found".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(SubscriptionError::Validation("bad".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(SubscriptionError::NotFound(1)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SubscriptionError::Storage("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::BadRequest("Invalid subscription ID".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_validation_body() {
        let response = AppError::from(SubscriptionError::Validation(
            "period must be in MM-YYYY format".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "period must be in MM-YYYY format");
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_storage_details_are_hidden() {
        let response = AppError::from(SubscriptionError::storage(
            "failed to create subscription",
            "database is locked",
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn test_not_found_body() {
        let response = AppError::from(SubscriptionError::NotFound(5)).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Subscription not found");
        assert_eq!(body["status"], 404);
    }
}

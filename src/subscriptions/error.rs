//! Subscription domain errors
//!
//! These errors carry no transport concerns. The HTTP layer decides how
//! each kind is presented (see `crate::error::AppError`).

use thiserror::Error;

/// Errors produced by the subscription service and its stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Input failed a format or business rule
    #[error("{0}")]
    Validation(String),

    /// No subscription exists with the given id
    #[error("Subscription not found: {0}")]
    NotFound(i64),

    /// The backing store failed; the message carries the operation context
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SubscriptionError {
    /// Wrap a backend failure with the operation that was attempted
    pub fn storage(context: &str, err: impl std::fmt::Display) -> Self {
        SubscriptionError::Storage(format!("{}: {}", context, err))
    }
}

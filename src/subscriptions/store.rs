//! Storage abstraction for subscriptions
//!
//! The service only talks to a `SubscriptionStore`. Each call is atomic from
//! the caller's point of view; concurrency control belongs to the backend.

use super::error::SubscriptionError;
use super::models::{Subscription, SubscriptionFilter, SubscriptionRequest};
use async_trait::async_trait;

/// Persistence operations required by the subscription service
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert a new subscription; the store assigns `id`, `created_at` and `updated_at`
    async fn create(&self, request: &SubscriptionRequest)
        -> Result<Subscription, SubscriptionError>;

    /// Fetch one subscription, or `NotFound`
    async fn get_by_id(&self, id: i64) -> Result<Subscription, SubscriptionError>;

    /// Fetch every subscription, most recently created first
    async fn get_all(&self) -> Result<Vec<Subscription>, SubscriptionError>;

    /// Overwrite the writable fields of `id` and refresh `updated_at`
    ///
    /// Returns the stored record, or `NotFound` if no row was affected.
    async fn update(
        &self,
        id: i64,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError>;

    /// Hard-delete `id`, or `NotFound` if no row was affected
    async fn delete(&self, id: i64) -> Result<(), SubscriptionError>;

    /// Fetch the subscriptions matching every criterion set in `filter`,
    /// most recently created first
    async fn get_by_filter(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, SubscriptionError>;

    /// Short backend name for logs
    fn kind(&self) -> &'static str;
}

//! In-memory subscription store
//!
//! Keeps rows in process memory behind an async lock. Honours the same
//! contract as the SQL store, including text comparison of periods.

use super::error::SubscriptionError;
use super::models::{Subscription, SubscriptionFilter, SubscriptionRequest};
use super::store::SubscriptionStore;
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Reverse;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: Vec<Subscription>,
}

/// Subscription store backed by a vector in memory
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    inner: RwLock<Inner>,
}

impl InMemorySubscriptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored subscriptions
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Whether the store holds no subscriptions
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn newest_first(mut rows: Vec<Subscription>) -> Vec<Subscription> {
    rows.sort_by_key(|s| Reverse((s.created_at, s.id)));
    rows
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn create(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let subscription = Subscription {
            id: inner.next_id,
            service_name: request.service_name.clone(),
            price: request.price,
            user_id: request.user_id,
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.rows.push(subscription.clone());

        debug!("Created subscription: {}", subscription.id);
        Ok(subscription)
    }

    async fn get_by_id(&self, id: i64) -> Result<Subscription, SubscriptionError> {
        self.inner
            .read()
            .await
            .rows
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(SubscriptionError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        Ok(newest_first(self.inner.read().await.rows.clone()))
    }

    async fn update(
        &self,
        id: i64,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        let mut inner = self.inner.write().await;
        let subscription = inner
            .rows
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SubscriptionError::NotFound(id))?;

        subscription.service_name = request.service_name.clone();
        subscription.price = request.price;
        subscription.user_id = request.user_id;
        subscription.start_date = request.start_date.clone();
        subscription.end_date = request.end_date.clone();
        subscription.updated_at = Utc::now();

        debug!("Updated subscription: {}", id);
        Ok(subscription.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), SubscriptionError> {
        let mut inner = self.inner.write().await;
        let before = inner.rows.len();
        inner.rows.retain(|s| s.id != id);
        if inner.rows.len() == before {
            return Err(SubscriptionError::NotFound(id));
        }

        debug!("Deleted subscription: {}", id);
        Ok(())
    }

    async fn get_by_filter(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        let rows = self
            .inner
            .read()
            .await
            .rows
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        Ok(newest_first(rows))
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

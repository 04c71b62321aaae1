//! Subscription service
//!
//! Applies the business rules (period formats) and delegates persistence to
//! a `SubscriptionStore`. Holds no state besides the store handle, so one
//! instance is shared by every request.

use super::error::SubscriptionError;
use super::models::{Subscription, SubscriptionFilter, SubscriptionRequest, SummaryCostResponse};
use super::period::validate_period;
use super::store::SubscriptionStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Business operations over subscriptions
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    /// Create a service on top of `store`
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Name of the backing store, for logs
    pub fn store_kind(&self) -> &'static str {
        self.store.kind()
    }

    /// Validate the period fields and persist a new subscription
    ///
    /// # Returns
    /// * `Ok(Subscription)` - the stored record with its id and timestamps
    /// * `Err(SubscriptionError::Validation)` - a date is malformed; nothing is written
    /// * `Err(SubscriptionError::Storage)` - the store failed
    pub async fn create(
        &self,
        request: SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        validate_dates(&request)?;

        let subscription = self.store.create(&request).await?;
        info!(
            subscription_id = subscription.id,
            user_id = %subscription.user_id,
            service_name = %subscription.service_name,
            "Subscription created"
        );
        Ok(subscription)
    }

    /// Fetch one subscription
    pub async fn get_by_id(&self, id: i64) -> Result<Subscription, SubscriptionError> {
        debug!(subscription_id = id, "Fetching subscription");
        self.store.get_by_id(id).await
    }

    /// Fetch every subscription, most recently created first
    pub async fn get_all(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        let subscriptions = self.store.get_all().await?;
        debug!(count = subscriptions.len(), "Fetched subscriptions");
        Ok(subscriptions)
    }

    /// Validate the period fields and overwrite subscription `id`
    ///
    /// Fails with `NotFound` when `id` does not exist; no row is created.
    pub async fn update(
        &self,
        id: i64,
        request: SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        validate_dates(&request)?;

        let subscription = self.store.update(id, &request).await?;
        info!(subscription_id = id, "Subscription updated");
        Ok(subscription)
    }

    /// Hard-delete subscription `id`
    pub async fn delete(&self, id: i64) -> Result<(), SubscriptionError> {
        self.store.delete(id).await?;
        info!(subscription_id = id, "Subscription deleted");
        Ok(())
    }

    /// Sum the price of every subscription matching `filter`
    ///
    /// The period, when given, must be `MM-YYYY`. The summary's period label
    /// is `"all time"` when no period was given.
    pub async fn calculate_total_cost(
        &self,
        filter: SubscriptionFilter,
    ) -> Result<SummaryCostResponse, SubscriptionError> {
        if let Some(period) = &filter.period {
            validate_period("period", period)?;
        }

        let items = self.store.get_by_filter(&filter).await?;
        let summary = SummaryCostResponse::from_items(filter, items)?;
        debug!(
            total_cost = summary.total_cost,
            count = summary.items.len(),
            period = %summary.period,
            "Calculated total cost"
        );
        Ok(summary)
    }
}

// An end date earlier than the start date is accepted as-is.
fn validate_dates(request: &SubscriptionRequest) -> Result<(), SubscriptionError> {
    validate_period("start_date", &request.start_date)?;
    if let Some(end_date) = &request.end_date {
        validate_period("end_date", end_date)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriptions::memory::InMemorySubscriptionStore;
    use crate::subscriptions::models::ALL_TIME;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Store that counts calls and fails every one of them
    #[derive(Default)]
    struct FailingStore {
        calls: AtomicUsize,
    }

    impl FailingStore {
        fn fail<T>(&self) -> Result<T, SubscriptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SubscriptionError::storage("failed", "connection refused"))
        }
    }

    #[async_trait]
    impl SubscriptionStore for FailingStore {
        async fn create(&self, _: &SubscriptionRequest) -> Result<Subscription, SubscriptionError> {
            self.fail()
        }
        async fn get_by_id(&self, _: i64) -> Result<Subscription, SubscriptionError> {
            self.fail()
        }
        async fn get_all(&self) -> Result<Vec<Subscription>, SubscriptionError> {
            self.fail()
        }
        async fn update(
            &self,
            _: i64,
            _: &SubscriptionRequest,
        ) -> Result<Subscription, SubscriptionError> {
            self.fail()
        }
        async fn delete(&self, _: i64) -> Result<(), SubscriptionError> {
            self.fail()
        }
        async fn get_by_filter(
            &self,
            _: &SubscriptionFilter,
        ) -> Result<Vec<Subscription>, SubscriptionError> {
            self.fail()
        }
        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    fn create_test_service() -> (SubscriptionService, Arc<InMemorySubscriptionStore>) {
        let store = Arc::new(InMemorySubscriptionStore::new());
        (SubscriptionService::new(store.clone()), store)
    }

    fn request(service: &str, price: i64, user_id: Uuid, start: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            service_name: service.to_string(),
            price,
            user_id,
            start_date: start.to_string(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (service, _) = create_test_service();
        let user = Uuid::new_v4();
        let mut req = request("Yandex Plus", 400, user, "07-2025");
        req.end_date = Some("12-2025".to_string());

        let created = service.create(req.clone()).await.unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.service_name, req.service_name);
        assert_eq!(fetched.price, req.price);
        assert_eq!(fetched.user_id, user);
        assert_eq!(fetched.start_date, req.start_date);
        assert_eq!(fetched.end_date, req.end_date);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_start_date_without_writing() {
        let store = Arc::new(FailingStore::default());
        let service = SubscriptionService::new(store.clone());

        let err = service
            .create(request("Netflix", 799, Uuid::new_v4(), "13-2025"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubscriptionError::Validation("start_date must be in MM-YYYY format".to_string())
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_end_date() {
        let (service, store) = create_test_service();
        let mut req = request("Netflix", 799, Uuid::new_v4(), "07-2025");
        req.end_date = Some("2025-12".to_string());

        let err = service.create(req).await.unwrap_err();
        assert!(matches!(err, SubscriptionError::Validation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_accepts_end_before_start() {
        let (service, _) = create_test_service();
        let mut req = request("Netflix", 799, Uuid::new_v4(), "07-2025");
        req.end_date = Some("01-2025".to_string());

        let created = service.create(req).await.unwrap();
        assert_eq!(created.end_date.as_deref(), Some("01-2025"));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let service = SubscriptionService::new(Arc::new(FailingStore::default()));
        let err = service
            .create(request("Netflix", 799, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Storage(_)));
        assert!(matches!(
            service.get_all().await.unwrap_err(),
            SubscriptionError::Storage(_)
        ));
    }

    #[tokio::test]
    async fn test_get_all_empty() {
        let (service, _) = create_test_service();
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id_creates_nothing() {
        let (service, store) = create_test_service();
        let err = service
            .update(99, request("Netflix", 799, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap_err();
        assert_eq!(err, SubscriptionError::NotFound(99));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_validates_dates_first() {
        let (service, _) = create_test_service();
        let created = service
            .create(request("Netflix", 799, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap();

        let err = service
            .update(created.id, request("Netflix", 799, created.user_id, "7-2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, SubscriptionError::Validation(_)));
        assert_eq!(service.get_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let (service, _) = create_test_service();
        let created = service
            .create(request("Netflix", 799, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap();

        let updated = service
            .update(created.id, request("Netflix", 999, created.user_id, "08-2025"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 999);
        assert_eq!(updated.start_date, "08-2025");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let (service, _) = create_test_service();
        let created = service
            .create(request("Netflix", 799, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap();

        service.delete(created.id).await.unwrap();
        assert_eq!(
            service.get_by_id(created.id).await.unwrap_err(),
            SubscriptionError::NotFound(created.id)
        );
        assert_eq!(
            service.delete(created.id).await.unwrap_err(),
            SubscriptionError::NotFound(created.id)
        );
    }

    #[tokio::test]
    async fn test_total_cost_for_user() {
        let (service, _) = create_test_service();
        let user = Uuid::new_v4();
        service
            .create(request("Service 1", 400, user, "07-2025"))
            .await
            .unwrap();
        service
            .create(request("Service 2", 600, user, "07-2025"))
            .await
            .unwrap();
        service
            .create(request("Service 1", 250, Uuid::new_v4(), "07-2025"))
            .await
            .unwrap();

        let filter = SubscriptionFilter {
            user_id: Some(user),
            ..Default::default()
        };
        let summary = service.calculate_total_cost(filter).await.unwrap();
        assert_eq!(summary.total_cost, 1000);
        assert_eq!(summary.items.len(), 2);
        assert!(summary.items.iter().all(|s| s.user_id == user));
        assert_eq!(summary.user_id, Some(user));
    }

    #[tokio::test]
    async fn test_total_cost_without_filters() {
        let (service, _) = create_test_service();
        for price in [100, 200, 300] {
            service
                .create(request("Netflix", price, Uuid::new_v4(), "07-2025"))
                .await
                .unwrap();
        }

        let summary = service
            .calculate_total_cost(SubscriptionFilter::default())
            .await
            .unwrap();
        assert_eq!(summary.total_cost, 600);
        assert_eq!(summary.period, ALL_TIME);
        assert_eq!(summary.items.len(), 3);
    }

    #[tokio::test]
    async fn test_total_cost_for_period() {
        let (service, _) = create_test_service();
        let user = Uuid::new_v4();
        let mut ended = request("Netflix", 799, user, "01-2025");
        ended.end_date = Some("06-2025".to_string());
        service.create(ended).await.unwrap();
        service
            .create(request("Spotify", 299, user, "07-2025"))
            .await
            .unwrap();

        let filter = SubscriptionFilter {
            period: Some("07-2025".to_string()),
            ..Default::default()
        };
        let summary = service.calculate_total_cost(filter).await.unwrap();
        assert_eq!(summary.total_cost, 299);
        assert_eq!(summary.period, "07-2025");
    }

    #[tokio::test]
    async fn test_total_cost_rejects_bad_period() {
        let store = Arc::new(FailingStore::default());
        let service = SubscriptionService::new(store.clone());
        let filter = SubscriptionFilter {
            period: Some("2025-07".to_string()),
            ..Default::default()
        };

        let err = service.calculate_total_cost(filter).await.unwrap_err();
        assert_eq!(
            err,
            SubscriptionError::Validation("period must be in MM-YYYY format".to_string())
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }
}

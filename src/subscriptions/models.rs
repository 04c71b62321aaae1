//! Subscription data models
//!
//! Defines the stored subscription record, the write payload shared by
//! create and update, the filter used for cost queries, and the cost summary.

use super::error::SubscriptionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Label used in a cost summary when no period filter was applied
pub const ALL_TIME: &str = "all time";

/// A stored subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    /// Identifier assigned by the store on creation
    pub id: i64,
    /// Name of the subscribed service
    pub service_name: String,
    /// Monthly price in minor currency units, always positive
    pub price: i64,
    /// Owning user
    pub user_id: Uuid,
    /// First billed month, `MM-YYYY`
    pub start_date: String,
    /// Last billed month, `MM-YYYY`; absent while the subscription is ongoing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// When the store first wrote the record
    pub created_at: DateTime<Utc>,
    /// When the store last wrote the record
    pub updated_at: DateTime<Utc>,
}

/// Writable subscription fields, used as the body of both create and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Name of the subscribed service
    pub service_name: String,
    /// Monthly price in minor currency units
    pub price: i64,
    /// Owning user
    pub user_id: Uuid,
    /// First billed month, `MM-YYYY`
    pub start_date: String,
    /// Last billed month, `MM-YYYY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    /// Validate the request shape
    /// Returns Ok(()) if valid, Err with message if invalid
    ///
    /// Period formats are a business rule and are checked by the service.
    pub fn validate(&self) -> Result<(), String> {
        if self.service_name.trim().is_empty() {
            return Err("service_name cannot be empty".to_string());
        }
        if self.price <= 0 {
            return Err("price must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Conjunctive filter for cost queries; every criterion is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    /// Only subscriptions owned by this user
    pub user_id: Option<Uuid>,
    /// Only subscriptions to this service (exact match)
    pub service_name: Option<String>,
    /// Only subscriptions active during this `MM-YYYY` month
    pub period: Option<String>,
}

impl SubscriptionFilter {
    /// Check a subscription against every criterion that is set
    ///
    /// Period bounds are compared as plain strings, the same way the SQL
    /// store compares them, so `"12-2024" >= "01-2025"` holds here as well.
    pub fn matches(&self, subscription: &Subscription) -> bool {
        if let Some(user_id) = self.user_id {
            if subscription.user_id != user_id {
                return false;
            }
        }

        if let Some(service_name) = &self.service_name {
            if &subscription.service_name != service_name {
                return false;
            }
        }

        if let Some(period) = &self.period {
            if subscription.start_date.as_str() > period.as_str() {
                return false;
            }
            if let Some(end_date) = &subscription.end_date {
                if end_date.as_str() < period.as_str() {
                    return false;
                }
            }
        }

        true
    }
}

/// Aggregated cost over a filtered set of subscriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCostResponse {
    /// Sum of `price` over `items`
    pub total_cost: i64,
    /// The period filter, or `"all time"`
    pub period: String,
    /// User filter, if one was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Service filter, if one was applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// The matching subscriptions
    #[serde(rename = "subscriptions")]
    pub items: Vec<Subscription>,
}

impl SummaryCostResponse {
    /// Build a summary from the filter that was applied and its matches
    ///
    /// Fails with `Validation` when the total does not fit in an `i64`; a
    /// narrower filter can still be summed.
    pub fn from_items(
        filter: SubscriptionFilter,
        items: Vec<Subscription>,
    ) -> Result<Self, SubscriptionError> {
        let total_cost = items
            .iter()
            .try_fold(0i64, |acc, s| acc.checked_add(s.price))
            .ok_or_else(|| {
                SubscriptionError::Validation(
                    "total cost exceeds the supported range".to_string(),
                )
            })?;

        Ok(Self {
            total_cost,
            period: filter.period.unwrap_or_else(|| ALL_TIME.to_string()),
            user_id: filter.user_id,
            service_name: filter.service_name,
            items,
        })
    }
}

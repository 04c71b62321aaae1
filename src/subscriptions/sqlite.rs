//! SQLite subscription store
//!
//! Relational backend built on a sqlx connection pool. The schema is created
//! from the embedded migration on connect.

use super::error::SubscriptionError;
use super::models::{Subscription, SubscriptionFilter, SubscriptionRequest};
use super::store::SubscriptionStore;
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

const MIGRATION_SQL: &str = include_str!("../../migrations/001_create_subscriptions.sql");

/// Subscription store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSubscriptionStore {
    pool: SqlitePool,
}

impl SqliteSubscriptionStore {
    /// Open a connection pool, verify it, and apply the schema
    ///
    /// # Arguments
    /// * `url` - SQLite connection string; a bare path gets the `sqlite:` prefix
    /// * `max_connections` - Pool size
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let connection_string = if url.starts_with("sqlite:") {
            url.to_string()
        } else {
            format!("sqlite:{}", url)
        };

        let options = SqliteConnectOptions::from_str(&connection_string)
            .with_context(|| format!("Invalid database url: {}", url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .context("Failed to ping database")?;

        info!("Connected to SQLite database at: {}", connection_string);

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Apply the embedded schema; safe to run repeatedly
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        info!("Running database migrations...");

        for statement in migration_statements(MIGRATION_SQL) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!(
                        "Migration failed - Statement: {}",
                        statement.chars().take(100).collect::<String>()
                    )
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

/// Split a migration script into executable statements, dropping `--` comments
fn migration_statements(sql: &str) -> Vec<String> {
    let cleaned: String = sql
        .lines()
        .map(|line| match line.find("--") {
            Some(pos) => &line[..pos],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    cleaned
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the SELECT for a cost query
///
/// Criteria are ANDed and every value is bound, never interpolated. The
/// period test compares `MM-YYYY` text: `start_date <= period` and an open or
/// later `end_date`.
pub fn build_filter_query(filter: &SubscriptionFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM subscriptions WHERE 1=1", COLUMNS));

    if let Some(user_id) = filter.user_id {
        query.push(" AND user_id = ").push_bind(user_id);
    }

    if let Some(service_name) = &filter.service_name {
        query
            .push(" AND service_name = ")
            .push_bind(service_name.clone());
    }

    if let Some(period) = &filter.period {
        query.push(" AND start_date <= ").push_bind(period.clone());
        query
            .push(" AND (end_date IS NULL OR end_date >= ")
            .push_bind(period.clone())
            .push(")");
    }

    query.push(" ORDER BY created_at DESC, id DESC");
    query
}

#[async_trait]
impl SubscriptionStore for SqliteSubscriptionStore {
    async fn create(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO subscriptions (service_name, price, user_id, start_date, end_date, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.service_name)
        .bind(request.price)
        .bind(request.user_id)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| SubscriptionError::storage("failed to create subscription", e))?;

        let subscription = Subscription {
            id: result.last_insert_rowid(),
            service_name: request.service_name.clone(),
            price: request.price,
            user_id: request.user_id,
            start_date: request.start_date.clone(),
            end_date: request.end_date.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!("Created subscription: {}", subscription.id);
        Ok(subscription)
    }

    async fn get_by_id(&self, id: i64) -> Result<Subscription, SubscriptionError> {
        let sql = format!("SELECT {} FROM subscriptions WHERE id = ?", COLUMNS);
        let row = sqlx::query_as::<_, Subscription>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SubscriptionError::storage("failed to get subscription", e))?;
        row.ok_or(SubscriptionError::NotFound(id))
    }

    async fn get_all(&self) -> Result<Vec<Subscription>, SubscriptionError> {
        let sql = format!(
            "SELECT {} FROM subscriptions ORDER BY created_at DESC, id DESC",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Subscription>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SubscriptionError::storage("failed to get subscriptions", e))?;
        Ok(rows)
    }

    async fn update(
        &self,
        id: i64,
        request: &SubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        let result = sqlx::query(
            "UPDATE subscriptions SET service_name = ?, price = ?, user_id = ?, start_date = ?, end_date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&request.service_name)
        .bind(request.price)
        .bind(request.user_id)
        .bind(&request.start_date)
        .bind(&request.end_date)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| SubscriptionError::storage("failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::NotFound(id));
        }

        debug!("Updated subscription: {}", id);
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), SubscriptionError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| SubscriptionError::storage("failed to delete subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(SubscriptionError::NotFound(id));
        }

        debug!("Deleted subscription: {}", id);
        Ok(())
    }

    async fn get_by_filter(
        &self,
        filter: &SubscriptionFilter,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        let mut query = build_filter_query(filter);
        let rows = query
            .build_query_as::<Subscription>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SubscriptionError::storage("failed to get filtered subscriptions", e))?;
        Ok(rows)
    }

    fn kind(&self) -> &'static str {
        "sqlite"
    }
}

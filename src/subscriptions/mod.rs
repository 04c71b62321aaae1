//! Subscription domain
//!
//! Models, period validation, the storage abstraction with its SQLite and
//! in-memory backends, and the service that ties them together.

pub mod error;
pub mod memory;
pub mod models;
pub mod period;
pub mod service;
pub mod sqlite;
pub mod store;

pub use error::SubscriptionError;
pub use memory::InMemorySubscriptionStore;
pub use models::{Subscription, SubscriptionFilter, SubscriptionRequest, SummaryCostResponse};
pub use period::{is_valid_period, validate_period};
pub use service::SubscriptionService;
pub use sqlite::SqliteSubscriptionStore;
pub use store::SubscriptionStore;

//! Subscription Service Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
/// Subscription domain: models, validation, storage and service
pub mod subscriptions;

//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Loaded once at startup and passed explicitly to
//! whatever needs it.

use std::env;

/// Value of `DATABASE_URL` that selects the in-memory store
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Connection string, or `memory` for the in-memory store
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Requested verbosity. Reported at startup; output filtering is driven by `RUST_LOG`.
    pub level: String,
}

impl DatabaseConfig {
    /// Whether the in-memory store was requested instead of a database
    pub fn is_memory(&self) -> bool {
        self.url.eq_ignore_ascii_case(MEMORY_DATABASE_URL)
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env_parse("PORT").unwrap_or(8080),
                host: env_string("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                url: env_string("DATABASE_URL")
                    .unwrap_or_else(|| "sqlite:subscriptions.db".to_string()),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .filter(|n| *n > 0)
                    .unwrap_or(5),
            },
            logging: LoggingConfig {
                level: env_string("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Empty values count as unset.
fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.trim().parse().ok())
}

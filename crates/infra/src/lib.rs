//! Infrastructure layer: quote stores, database pool, configuration and wiring.

pub mod backend;
pub mod config;
pub mod db;
pub mod quote_store;
pub mod services;

pub use backend::QuoteBackend;
pub use config::{AppConfig, ConfigError, DataBackend, DatabaseConfig};
pub use quote_store::{InMemoryQuoteRepository, PostgresQuoteRepository};
pub use services::{Services, SharedQuoteRepository};

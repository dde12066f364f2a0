//! `servicebay-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod page;
pub mod time;

pub use aggregate::AggregateRoot;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, LineItemId, QuoteId, VehicleId};
pub use page::Page;
pub use time::storage_now;

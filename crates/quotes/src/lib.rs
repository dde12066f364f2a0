//! Quotes domain module.
//!
//! Quotes are itemized estimates for servicing a customer's vehicle. This crate
//! holds the aggregate, the persistence contract every store implements, and
//! the business service on top of it. It performs no IO itself.

pub mod quote;
pub mod repository;
pub mod service;

pub use quote::{CreateInput, CreateLineItem, LineItem, Quote, QuoteStatus};
pub use repository::{
    NullQuoteRepository, QuoteError, QuoteRepository, QuoteResult, canonical_order,
    normalize_line_items, refreshed_updated_at, sort_canonical, validate_line_items,
};
pub use service::QuoteService;

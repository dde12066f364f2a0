//! Quote persistence boundary.
//!
//! Every store (in-memory, relational) implements [`QuoteRepository`] with the
//! same observable behavior:
//!
//! - `find_by_id` returns the quote with its full, ordered line-item sequence.
//! - `save` upserts keyed on the quote identifier:
//!   - unassigned id: insert, assign a new id, `created_at = updated_at = now`
//!   - assigned id: update; `NotFound` if the record is gone, otherwise keep the
//!     stored `created_at`, set `updated_at = now` and replace the whole
//!     line-item set (delete-then-insert, never merged)
//!   - in both cases line items are normalized with [`normalize_line_items`]
//!     right before they are persisted; a line item with zero quantity is
//!     rejected with `Invalid` and nothing is written
//!   - `updated_at` strictly increases on every successful save (see
//!     [`refreshed_updated_at`])
//! - `list_by_customer` returns quotes ordered by `created_at` ascending, ties
//!   broken by id ascending (see [`sort_canonical`]), then windowed by
//!   [`Page`]. An offset past the end yields an empty list.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use servicebay_core::{CustomerId, DomainError, LineItemId, Page, QuoteId, storage_now};

use crate::quote::{LineItem, Quote};

pub type QuoteResult<T> = Result<T, QuoteError>;

/// Quote operation error.
///
/// `NotFound` and `NotImplemented` are meant to be matched on by callers;
/// `Storage` wraps transport/engine failures with operation context and is
/// opaque.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("quote not found")]
    NotFound,

    #[error("quotes repository: not implemented")]
    NotImplemented,

    #[error("invalid quote: {0}")]
    Invalid(String),

    #[error("quote storage error: {0}")]
    Storage(String),
}

impl QuoteError {
    pub fn storage(operation: &str, err: impl core::fmt::Display) -> Self {
        Self::Storage(format!("{operation}: {err}"))
    }
}

impl From<DomainError> for QuoteError {
    fn from(err: DomainError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Persistence contract for quotes.
pub trait QuoteRepository: Send + Sync {
    /// Load a quote and its ordered line items.
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote>;

    /// Insert or update a quote; returns the canonical stored aggregate.
    fn save(&self, quote: Quote) -> QuoteResult<Quote>;

    /// Quotes for a customer in canonical order, windowed by `page`.
    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>>;
}

impl<S> QuoteRepository for Arc<S>
where
    S: QuoteRepository + ?Sized,
{
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote> {
        (**self).find_by_id(id)
    }

    fn save(&self, quote: Quote) -> QuoteResult<Quote> {
        (**self).save(quote)
    }

    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        (**self).list_by_customer(customer_id, page)
    }
}

impl<S> QuoteRepository for &S
where
    S: QuoteRepository + ?Sized,
{
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote> {
        (**self).find_by_id(id)
    }

    fn save(&self, quote: Quote) -> QuoteResult<Quote> {
        (**self).save(quote)
    }

    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        (**self).list_by_customer(customer_id, page)
    }
}

/// Repository for deployments with no quote store configured.
///
/// Every operation fails with [`QuoteError::NotImplemented`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NullQuoteRepository;

impl QuoteRepository for NullQuoteRepository {
    fn find_by_id(&self, _id: &QuoteId) -> QuoteResult<Quote> {
        Err(QuoteError::NotImplemented)
    }

    fn save(&self, _quote: Quote) -> QuoteResult<Quote> {
        Err(QuoteError::NotImplemented)
    }

    fn list_by_customer(&self, _customer_id: &CustomerId, _page: Page) -> QuoteResult<Vec<Quote>> {
        Err(QuoteError::NotImplemented)
    }
}

/// Reject line items no store may persist.
///
/// Quantity must be positive. This is the only line-item rule; every store
/// applies it through [`normalize_line_items`].
pub fn validate_line_items(items: &[LineItem]) -> QuoteResult<()> {
    match items.iter().position(|item| item.quantity == 0) {
        Some(idx) => Err(QuoteError::Invalid(format!(
            "line item {idx}: quantity must be positive"
        ))),
        None => Ok(()),
    }
}

/// Save-time normalization of the line-item sequence.
///
/// Validates the items, gives every item lacking an id a fresh one, points
/// `quote_id` at the owning quote and overwrites `sort_order` with the item's
/// index. Call after the quote id is known.
pub fn normalize_line_items(quote: &mut Quote) -> QuoteResult<()> {
    validate_line_items(&quote.line_items)?;

    let quote_id = quote.id.clone();
    for (idx, item) in quote.line_items.iter_mut().enumerate() {
        if item.id.is_unassigned() {
            item.id = LineItemId::generate();
        }
        item.quote_id = quote_id.clone();
        item.sort_order = u32::try_from(idx).unwrap_or(u32::MAX);
    }
    Ok(())
}

/// `updated_at` for a re-save of a quote last stamped at `previous`.
///
/// Never earlier than one microsecond after `previous`, so two saves within
/// the same clock tick still yield distinct, increasing stamps.
pub fn refreshed_updated_at(previous: DateTime<Utc>) -> DateTime<Utc> {
    storage_now().max(previous + Duration::microseconds(1))
}

/// Canonical listing order: `created_at` ascending, then id ascending.
pub fn canonical_order(a: &Quote, b: &Quote) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_canonical(quotes: &mut [Quote]) {
    quotes.sort_by(canonical_order);
}

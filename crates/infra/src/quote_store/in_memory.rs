use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::instrument;

use servicebay_core::{AggregateRoot, CustomerId, Page, QuoteId, storage_now};
use servicebay_quotes::{
    Quote, QuoteError, QuoteRepository, QuoteResult, normalize_line_items, refreshed_updated_at,
    sort_canonical,
};

/// In-memory quote store.
///
/// One reader/writer lock guards the whole map: lookups and listings share
/// the read lock, saves take the write lock and mutate the map in a single
/// step. Intended for tests/dev and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<HashMap<QuoteId, Quote>>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored quotes (all customers).
    pub fn len(&self) -> QuoteResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> QuoteResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> QuoteResult<RwLockReadGuard<'_, HashMap<QuoteId, Quote>>> {
        self.quotes
            .read()
            .map_err(|_| QuoteError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> QuoteResult<RwLockWriteGuard<'_, HashMap<QuoteId, Quote>>> {
        self.quotes
            .write()
            .map_err(|_| QuoteError::Storage("lock poisoned".to_string()))
    }
}

impl QuoteRepository for InMemoryQuoteRepository {
    #[instrument(skip_all, fields(quote_id = %id), err)]
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote> {
        self.read()?.get(id).cloned().ok_or(QuoteError::NotFound)
    }

    #[instrument(skip_all, fields(quote_id = %quote.id, customer_id = %quote.customer_id), err)]
    fn save(&self, mut quote: Quote) -> QuoteResult<Quote> {
        let mut quotes = self.write()?;

        if quote.is_new() {
            quote.id = QuoteId::generate();
            quote.created_at = storage_now();
            quote.updated_at = quote.created_at;
        } else {
            let existing = quotes.get(&quote.id).ok_or(QuoteError::NotFound)?;
            quote.created_at = existing.created_at;
            quote.updated_at = refreshed_updated_at(existing.updated_at);
        }

        // Line items are replaced wholesale with the normalized input sequence.
        normalize_line_items(&mut quote)?;

        quotes.insert(quote.id.clone(), quote.clone());
        Ok(quote)
    }

    #[instrument(skip_all, fields(customer_id = %customer_id, offset = page.offset), err)]
    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        let mut matching: Vec<Quote> = self
            .read()?
            .values()
            .filter(|q| &q.customer_id == customer_id)
            .cloned()
            .collect();

        sort_canonical(&mut matching);
        Ok(page.apply(matching))
    }
}

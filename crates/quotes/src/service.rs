//! Quote business operations.
//!
//! The service builds and mutates quote aggregates and hands them to whichever
//! [`QuoteRepository`] it was constructed with. Repository errors are passed
//! through unchanged.

use tracing::{debug, info, instrument};

use servicebay_core::{CustomerId, Page, QuoteId};

use crate::quote::{CreateInput, LineItem, Quote, QuoteStatus};
use crate::repository::{QuoteRepository, QuoteResult};

#[derive(Debug, Clone)]
pub struct QuoteService<R> {
    repo: R,
}

impl<R> QuoteService<R>
where
    R: QuoteRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    #[instrument(skip_all, fields(quote_id = %id), err)]
    pub fn get(&self, id: &QuoteId) -> QuoteResult<Quote> {
        self.repo.find_by_id(id)
    }

    /// Create a draft quote and freeze its total.
    ///
    /// `total_amount` is Σ(quantity × unit_price) over `input.line_items`;
    /// each item's position in the input becomes its sort order. Line-item
    /// validity is the repository's call (see `validate_line_items`).
    #[instrument(
        skip_all,
        fields(
            customer_id = %input.customer_id,
            vehicle_id = %input.vehicle_id,
            line_items = input.line_items.len()
        ),
        err
    )]
    pub fn create(&self, input: CreateInput) -> QuoteResult<Quote> {
        let mut quote = Quote::draft(input.customer_id, input.vehicle_id);
        quote.line_items = input
            .line_items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| LineItem {
                id: Default::default(),
                quote_id: Default::default(),
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
                labor_hours: item.labor_hours,
                sort_order: u32::try_from(idx).unwrap_or(u32::MAX),
            })
            .collect();
        quote.total_amount = quote.line_items_total()?;

        let saved = self.repo.save(quote)?;
        info!(quote_id = %saved.id, total_amount = saved.total_amount, "quote created");
        Ok(saved)
    }

    /// Overwrite the status and re-save the whole aggregate.
    ///
    /// Any status may follow any other. Total and line items pass through
    /// untouched.
    #[instrument(skip_all, fields(quote_id = %id, status = %status), err)]
    pub fn update_status(&self, id: &QuoteId, status: QuoteStatus) -> QuoteResult<Quote> {
        let mut quote = self.repo.find_by_id(id)?;
        let previous = quote.status;
        quote.status = status;

        let saved = self.repo.save(quote)?;
        info!(quote_id = %saved.id, from = %previous, to = %saved.status, "quote status updated");
        Ok(saved)
    }

    #[instrument(skip_all, fields(customer_id = %customer_id, offset = page.offset), err)]
    pub fn list_for_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        let quotes = self.repo.list_by_customer(customer_id, page)?;
        debug!(count = quotes.len(), "listed quotes");
        Ok(quotes)
    }
}

//! Runtime selection of the quote store.

use tracing::{info, instrument};

use servicebay_core::{CustomerId, Page, QuoteId};
use servicebay_quotes::{Quote, QuoteError, QuoteRepository, QuoteResult};

use crate::config::{AppConfig, DataBackend};
use crate::db;
use crate::quote_store::{InMemoryQuoteRepository, PostgresQuoteRepository};

/// The quote store chosen by `DATA_BACKEND`.
#[derive(Debug)]
pub enum QuoteBackend {
    InMemory(InMemoryQuoteRepository),
    Postgres(PostgresQuoteRepository),
}

impl QuoteBackend {
    /// Build the configured backend, opening the database pool when needed.
    #[instrument(skip_all, fields(backend = ?config.data_backend), err)]
    pub async fn connect(config: &AppConfig) -> QuoteResult<Self> {
        match config.data_backend {
            DataBackend::Memory => {
                info!("using in-memory quote store");
                Ok(QuoteBackend::InMemory(InMemoryQuoteRepository::new()))
            }
            DataBackend::Postgres => {
                let database = config.database.as_ref().ok_or_else(|| {
                    QuoteError::storage("connect", "postgres backend has no database config")
                })?;
                let pool = db::connect_pool(database)
                    .await
                    .map_err(|e| QuoteError::storage("connect", e))?;
                info!("using postgres quote store");
                Ok(QuoteBackend::Postgres(PostgresQuoteRepository::new(pool)))
            }
        }
    }

    pub fn kind(&self) -> DataBackend {
        match self {
            QuoteBackend::InMemory(_) => DataBackend::Memory,
            QuoteBackend::Postgres(_) => DataBackend::Postgres,
        }
    }
}

impl QuoteRepository for QuoteBackend {
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote> {
        match self {
            QuoteBackend::InMemory(repo) => repo.find_by_id(id),
            QuoteBackend::Postgres(repo) => repo.find_by_id(id),
        }
    }

    fn save(&self, quote: Quote) -> QuoteResult<Quote> {
        match self {
            QuoteBackend::InMemory(repo) => repo.save(quote),
            QuoteBackend::Postgres(repo) => repo.save(quote),
        }
    }

    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        match self {
            QuoteBackend::InMemory(repo) => repo.list_by_customer(customer_id, page),
            QuoteBackend::Postgres(repo) => repo.list_by_customer(customer_id, page),
        }
    }
}

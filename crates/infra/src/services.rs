//! Application service container.

use std::sync::Arc;

use servicebay_quotes::{NullQuoteRepository, QuoteRepository, QuoteResult, QuoteService};
use tracing::warn;

use crate::backend::QuoteBackend;
use crate::config::AppConfig;

/// Shared repository handle used by the service container.
pub type SharedQuoteRepository = Arc<dyn QuoteRepository>;

/// Services available to request handlers.
#[derive(Clone)]
pub struct Services {
    pub quotes: QuoteService<SharedQuoteRepository>,
}

impl Services {
    /// Wire services onto `quote_repo`; with `None`, every quote operation
    /// fails with `NotImplemented`.
    pub fn new(quote_repo: Option<SharedQuoteRepository>) -> Self {
        let repo = quote_repo.unwrap_or_else(|| {
            warn!("no quote repository configured; quote operations are disabled");
            Arc::new(NullQuoteRepository)
        });

        Self {
            quotes: QuoteService::new(repo),
        }
    }

    /// Wire services onto the backend selected by `config`.
    pub async fn connect(config: &AppConfig) -> QuoteResult<Self> {
        let backend = QuoteBackend::connect(config).await?;
        Ok(Self::new(Some(Arc::new(backend) as SharedQuoteRepository)))
    }
}

impl core::fmt::Debug for Services {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

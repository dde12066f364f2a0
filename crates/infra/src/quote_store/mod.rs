//! Quote stores.
//!
//! Both stores implement [`servicebay_quotes::QuoteRepository`] with identical
//! observable behavior; the contract is documented on the trait module.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryQuoteRepository;
pub use postgres::PostgresQuoteRepository;

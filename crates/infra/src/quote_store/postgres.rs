//! Postgres-backed quote store.
//!
//! Quotes live in two tables: `quotes` (one row per quote) and
//! `quote_line_items` (one row per item, keyed by `quote_id` with an explicit
//! `sort_order` column). See `migrations/0001_quotes.sql`.
//!
//! ## Save
//!
//! `save` runs in a single transaction:
//! 1. insert the quote row and read back the generated id, or update it and
//!    read back the stored `created_at` (no row means `NotFound`)
//! 2. on update, delete every existing line-item row of the quote
//! 3. insert the normalized line items, `sort_order` = index
//! 4. commit
//!
//! Any failure rolls the whole transaction back; a partially written quote is
//! never visible to readers. Line items are validated before the transaction
//! starts.
//!
//! ## Reads
//!
//! `find_by_id` and `list_by_customer` read the quote rows and their line
//! items inside one `REPEATABLE READ, READ ONLY` transaction, so both come
//! from the same snapshot even while a save commits in between.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | QuoteError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Storage` |
//! | Database (foreign key violation) | `23503` | `Storage` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed | N/A | `Storage` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Storage` |

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Row, Transaction};
use tracing::{Span, instrument, warn};

use servicebay_core::{AggregateRoot, CustomerId, LineItemId, Page, QuoteId, VehicleId, storage_now};
use servicebay_quotes::{
    LineItem, Quote, QuoteError, QuoteRepository, QuoteResult, QuoteStatus, normalize_line_items,
    validate_line_items,
};

/// Postgres-backed quote store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool which is thread-safe (Arc + Send + Sync).
/// Each `save` holds one pooled connection for the duration of its
/// transaction only.
///
/// ## Concurrency
///
/// Saves of different quotes proceed in parallel, isolated by the database.
/// Concurrent saves of the same quote are last-commit-wins; there is no
/// version check.
#[derive(Debug, Clone)]
pub struct PostgresQuoteRepository {
    pool: Arc<PgPool>,
}

impl PostgresQuoteRepository {
    /// Create a new PostgresQuoteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Load a quote and its line items (ordered by `sort_order`).
    #[instrument(skip_all, fields(quote_id = %id), err)]
    pub async fn find_by_id_async(&self, id: &QuoteId) -> QuoteResult<Quote> {
        let mut tx = self.begin_snapshot("find_quote").await?;

        let row = sqlx::query(
            r#"
            SELECT id, customer_id, vehicle_id, status, total_amount, created_at, updated_at
            FROM quotes
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("find_quote", e))?
        .ok_or(QuoteError::NotFound)?;

        let mut quote = QuoteRow::from_row(&row)
            .map_err(|e| QuoteError::storage("decode_quote", e))?
            .into_quote()?;
        quote.line_items = fetch_line_items(&mut *tx, &quote.id).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_find_quote", e))?;
        Ok(quote)
    }

    /// Insert or update a quote and replace its line items, atomically.
    #[instrument(
        skip_all,
        fields(
            quote_id = %quote.id,
            customer_id = %quote.customer_id,
            line_items = quote.line_items.len()
        ),
        err
    )]
    pub async fn save_async(&self, quote: Quote) -> QuoteResult<Quote> {
        validate_line_items(&quote.line_items)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        match save_in_tx(&mut tx, quote).await {
            Ok(saved) => {
                tx.commit()
                    .await
                    .map_err(|e| map_sqlx_error("commit_quote_save", e))?;
                Span::current().record("quote_id", saved.id.as_str());
                Ok(saved)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback of failed quote save failed");
                }
                Err(err)
            }
        }
    }

    /// Quotes for a customer, oldest first (ties by id), windowed by `page`.
    #[instrument(
        skip_all,
        fields(customer_id = %customer_id, offset = page.offset, count = tracing::field::Empty),
        err
    )]
    pub async fn list_by_customer_async(
        &self,
        customer_id: &CustomerId,
        page: Page,
    ) -> QuoteResult<Vec<Quote>> {
        let mut tx = self.begin_snapshot("list_quotes").await?;

        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, vehicle_id, status, total_amount, created_at, updated_at
            FROM quotes
            WHERE customer_id = $1
            ORDER BY created_at ASC, id ASC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(customer_id.as_str())
        .bind(page.sql_offset())
        .bind(page.sql_limit())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("list_quotes", e))?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            let quote = QuoteRow::from_row(&row)
                .map_err(|e| QuoteError::storage("decode_quote", e))?
                .into_quote()?;
            quotes.push(quote);
        }

        Span::current().record("count", quotes.len());
        if !quotes.is_empty() {
            let ids: Vec<String> = quotes.iter().map(|q| q.id.to_string()).collect();
            let mut items_by_quote = fetch_line_items_for(&mut *tx, &ids).await?;
            for quote in &mut quotes {
                quote.line_items = items_by_quote.remove(&quote.id).unwrap_or_default();
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_list_quotes", e))?;
        Ok(quotes)
    }

    /// Start a read-only transaction pinned to a single snapshot.
    async fn begin_snapshot(&self, operation: &str) -> QuoteResult<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        Ok(tx)
    }

    /// Drive an async operation to completion from synchronous code.
    ///
    /// The `QuoteRepository` trait is synchronous, but SQLx is async. This
    /// requires an ambient multi-threaded Tokio runtime (e.g. an axum handler
    /// or `#[tokio::test(flavor = "multi_thread")]`).
    fn run<T>(&self, operation: &str, fut: impl Future<Output = QuoteResult<T>>) -> QuoteResult<T> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            QuoteError::storage(
                operation,
                "PostgresQuoteRepository requires a tokio runtime",
            )
        })?;

        if handle.runtime_flavor() != tokio::runtime::RuntimeFlavor::MultiThread {
            return Err(QuoteError::storage(
                operation,
                "PostgresQuoteRepository requires a multi-threaded tokio runtime",
            ));
        }

        tokio::task::block_in_place(|| handle.block_on(fut))
    }
}

impl QuoteRepository for PostgresQuoteRepository {
    fn find_by_id(&self, id: &QuoteId) -> QuoteResult<Quote> {
        self.run("find_quote", self.find_by_id_async(id))
    }

    fn save(&self, quote: Quote) -> QuoteResult<Quote> {
        self.run("save_quote", self.save_async(quote))
    }

    fn list_by_customer(&self, customer_id: &CustomerId, page: Page) -> QuoteResult<Vec<Quote>> {
        self.run("list_quotes", self.list_by_customer_async(customer_id, page))
    }
}

async fn fetch_line_items(conn: &mut PgConnection, quote_id: &QuoteId) -> QuoteResult<Vec<LineItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, quote_id, description, quantity, unit_price, labor_hours, sort_order
        FROM quote_line_items
        WHERE quote_id = $1
        ORDER BY sort_order ASC
        "#,
    )
    .bind(quote_id.as_str())
    .fetch_all(conn)
    .await
    .map_err(|e| map_sqlx_error("list_quote_line_items", e))?;

    rows.iter().map(decode_line_item).collect()
}

async fn fetch_line_items_for(
    conn: &mut PgConnection,
    quote_ids: &[String],
) -> QuoteResult<HashMap<QuoteId, Vec<LineItem>>> {
    let rows = sqlx::query(
        r#"
        SELECT id, quote_id, description, quantity, unit_price, labor_hours, sort_order
        FROM quote_line_items
        WHERE quote_id = ANY($1)
        ORDER BY quote_id ASC, sort_order ASC
        "#,
    )
    .bind(quote_ids)
    .fetch_all(conn)
    .await
    .map_err(|e| map_sqlx_error("list_quote_line_items", e))?;

    let mut grouped: HashMap<QuoteId, Vec<LineItem>> = HashMap::new();
    for row in &rows {
        let item = decode_line_item(row)?;
        grouped.entry(item.quote_id.clone()).or_default().push(item);
    }
    Ok(grouped)
}

/// Steps 1-3 of `save`; the caller owns commit/rollback.
async fn save_in_tx(tx: &mut Transaction<'_, Postgres>, mut quote: Quote) -> QuoteResult<Quote> {
    let now = storage_now();

    if quote.is_new() {
        let row = sqlx::query(
            r#"
            INSERT INTO quotes (customer_id, vehicle_id, status, total_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(quote.customer_id.as_str())
        .bind(quote.vehicle_id.as_str())
        .bind(quote.status.as_str())
        .bind(quote.total_amount)
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_quote", e))?;

        let id: String = row
            .try_get("id")
            .map_err(|e| QuoteError::storage("insert_quote", e))?;
        quote.id = QuoteId::new(id);
        quote.created_at = now;
        quote.updated_at = now;
    } else {
        let row = sqlx::query(
            r#"
            UPDATE quotes
               SET customer_id = $2,
                   vehicle_id = $3,
                   status = $4,
                   total_amount = $5,
                   updated_at = GREATEST($6, updated_at + interval '1 microsecond')
             WHERE id = $1
            RETURNING created_at, updated_at
            "#,
        )
        .bind(quote.id.as_str())
        .bind(quote.customer_id.as_str())
        .bind(quote.vehicle_id.as_str())
        .bind(quote.status.as_str())
        .bind(quote.total_amount)
        .bind(now)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("update_quote", e))?
        .ok_or(QuoteError::NotFound)?;

        quote.created_at = row
            .try_get("created_at")
            .map_err(|e| QuoteError::storage("update_quote", e))?;
        quote.updated_at = row
            .try_get("updated_at")
            .map_err(|e| QuoteError::storage("update_quote", e))?;

        sqlx::query("DELETE FROM quote_line_items WHERE quote_id = $1")
            .bind(quote.id.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| map_sqlx_error("delete_quote_line_items", e))?;
    }

    normalize_line_items(&mut quote)?;

    for item in &quote.line_items {
        let sort_order = i32::try_from(item.sort_order)
            .map_err(|e| QuoteError::storage("insert_quote_line_item", e))?;

        sqlx::query(
            r#"
            INSERT INTO quote_line_items (
                id,
                quote_id,
                description,
                quantity,
                unit_price,
                labor_hours,
                sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id.as_str())
        .bind(quote.id.as_str())
        .bind(&item.description)
        .bind(i64::from(item.quantity))
        .bind(item.unit_price)
        .bind(item.labor_hours)
        .bind(sort_order)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_quote_line_item", e))?;
    }

    Ok(quote)
}

/// Map SQLx errors to QuoteError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> QuoteError {
    match err {
        sqlx::Error::Database(db_err) => {
            let kind = match db_err.code().as_deref() {
                Some("23505") => "unique violation",
                Some("23503") => "foreign key violation",
                Some("23514") => "check violation",
                _ => "database error",
            };
            QuoteError::Storage(format!("{operation}: {kind}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            QuoteError::Storage(format!("{operation}: connection pool closed"))
        }
        sqlx::Error::RowNotFound => QuoteError::NotFound,
        other => QuoteError::storage(operation, other),
    }
}

// SQLx row types

#[derive(Debug)]
struct QuoteRow {
    id: String,
    customer_id: String,
    vehicle_id: String,
    status: String,
    total_amount: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for QuoteRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(QuoteRow {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            status: row.try_get("status")?,
            total_amount: row.try_get("total_amount")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl QuoteRow {
    fn into_quote(self) -> QuoteResult<Quote> {
        let status: QuoteStatus = self
            .status
            .parse()
            .map_err(|e| QuoteError::storage("decode_quote", e))?;

        Ok(Quote {
            id: QuoteId::new(self.id),
            customer_id: CustomerId::new(self.customer_id),
            vehicle_id: VehicleId::new(self.vehicle_id),
            status,
            total_amount: self.total_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            line_items: Vec::new(),
        })
    }
}

fn decode_line_item(row: &PgRow) -> QuoteResult<LineItem> {
    let decode = |e: sqlx::Error| QuoteError::storage("decode_quote_line_item", e);

    let quantity: i64 = row.try_get("quantity").map_err(decode)?;
    let sort_order: i32 = row.try_get("sort_order").map_err(decode)?;

    Ok(LineItem {
        id: LineItemId::new(row.try_get::<String, _>("id").map_err(decode)?),
        quote_id: QuoteId::new(row.try_get::<String, _>("quote_id").map_err(decode)?),
        description: row.try_get("description").map_err(decode)?,
        quantity: u32::try_from(quantity)
            .map_err(|e| QuoteError::storage("decode_quote_line_item", e))?,
        unit_price: row.try_get("unit_price").map_err(decode)?,
        labor_hours: row.try_get("labor_hours").map_err(decode)?,
        sort_order: u32::try_from(sort_order)
            .map_err(|e| QuoteError::storage("decode_quote_line_item", e))?,
    })
}

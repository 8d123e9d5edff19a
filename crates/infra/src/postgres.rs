//! Postgres-backed chart sources.
//!
//! ## Error Mapping
//!
//! | SQLx Error | FetchError |
//! |------------|------------|
//! | Database, PoolClosed, Io, other | `Unavailable` |
//! | ColumnDecode, ColumnNotFound, Decode | `Decode` |
//!
//! Unknown status strings in `orders.status` are reported as `Decode`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_analytics::{EventSource, FetchError};
use storefront_core::{CustomerId, OrderId};

use crate::charts::STOCK;
use crate::orders::{OrderFilter, OrderRecord};
use crate::stock::StockSnapshot;

/// Reads orders from the storefront's `orders` table.
///
/// Status and customer filtering happens in SQL; only orders that count
/// toward the chart leave the database.
#[derive(Debug, Clone)]
pub struct PostgresOrderSource {
    pool: Arc<PgPool>,
    filter: OrderFilter,
}

impl PostgresOrderSource {
    pub fn new(pool: PgPool, filter: OrderFilter) -> Self {
        Self {
            pool: Arc::new(pool),
            filter,
        }
    }

    /// Open a small pool against `database_url`.
    pub async fn connect(database_url: &str, filter: OrderFilter) -> Result<Self, FetchError> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool, filter))
    }

    pub fn filter(&self) -> &OrderFilter {
        &self.filter
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl EventSource for PostgresOrderSource {
    type Event = OrderRecord;

    #[instrument(skip(self), err)]
    async fn fetch_events(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, FetchError> {
        let statuses: Vec<String> = self
            .filter
            .statuses
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        let customer_id = self.filter.customer_id.map(|c| *c.as_uuid());

        let rows = sqlx::query(
            r#"
            SELECT
                id,
                customer_id,
                status,
                total_amount::float8 AS total_amount,
                created_at
            FROM orders
            WHERE created_at >= $1
              AND created_at <= $2
              AND status = ANY($3)
              AND ($4::uuid IS NULL OR customer_id = $4)
            ORDER BY created_at ASC
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .bind(statuses)
        .bind(customer_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_orders", e))?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(decode_order(row)?);
        }

        tracing::debug!(order_count = orders.len(), "fetched orders");
        Ok(orders)
    }
}

fn decode_order(row: &PgRow) -> Result<OrderRecord, FetchError> {
    let id: uuid::Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_order", e))?;
    let customer_id: Option<uuid::Uuid> = row
        .try_get("customer_id")
        .map_err(|e| map_sqlx_error("decode_order", e))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| map_sqlx_error("decode_order", e))?;
    let total_amount: f64 = row
        .try_get("total_amount")
        .map_err(|e| map_sqlx_error("decode_order", e))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| map_sqlx_error("decode_order", e))?;

    Ok(OrderRecord {
        id: OrderId::from_uuid(id),
        customer_id: customer_id.map(CustomerId::from_uuid),
        status: status
            .parse()
            .map_err(|e| FetchError::decode(format!("order {id}: {e}")))?,
        total_amount,
        created_at,
    })
}

/// Reads current stock from the `products` table.
///
/// No stock history is persisted, so `fetch_events` always comes back empty
/// and past buckets rely on the chart's history synthesizer.
#[derive(Debug, Clone)]
pub struct PostgresStockSource {
    pool: Arc<PgPool>,
}

impl PostgresStockSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for PostgresStockSource {
    type Event = StockSnapshot;

    async fn fetch_events(
        &self,
        _window_start: DateTime<Utc>,
        _window_end: DateTime<Utc>,
    ) -> Result<Vec<StockSnapshot>, FetchError> {
        Ok(Vec::new())
    }

    #[instrument(skip(self), err)]
    async fn sample_snapshot(&self, metric: &str) -> Result<f64, FetchError> {
        if metric != STOCK {
            return Err(FetchError::Unsupported(metric.to_string()));
        }

        let row = sqlx::query("SELECT COALESCE(SUM(stock), 0)::float8 AS total FROM products")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("sample_stock", e))?;

        row.try_get("total")
            .map_err(|e| map_sqlx_error("sample_stock", e))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> FetchError {
    match err {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) | sqlx::Error::Decode(_) => {
            FetchError::decode(format!("{operation}: {err}"))
        }
        sqlx::Error::PoolClosed => {
            FetchError::unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::Database(db_err) => {
            FetchError::unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        _ => FetchError::unavailable(format!("sqlx error in {operation}: {err}")),
    }
}

//! Prints an admin chart series as JSON.
//!
//! Usage: `storefront-chart [revenue|stock]` (default `revenue`).

use anyhow::{Context, bail};

use storefront_analytics::{Bucket, JitteredHistory};
use storefront_core::SystemClock;
use storefront_infra::{
    ChartConfig, InMemoryOrderStore, OrderRecord, OrderSourceConfig, PostgresOrderSource,
    PostgresStockSource, revenue_chart, stock_chart,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let chart = std::env::args().nth(1).unwrap_or_else(|| "revenue".to_string());
    let config = ChartConfig::from_env().context("invalid chart configuration")?;
    let source = OrderSourceConfig::from_env().context("no order source configured")?;

    tracing::info!(
        chart = %chart,
        granularity = %config.series.granularity,
        point_count = config.series.point_count,
        "building chart"
    );

    let buckets: Vec<Bucket> = match (chart.as_str(), source) {
        ("revenue", OrderSourceConfig::Postgres { database_url }) => {
            let orders = PostgresOrderSource::connect(&database_url, config.filter).await?;
            revenue_chart(SystemClock, config.series, &orders).await?
        }
        ("revenue", OrderSourceConfig::File { path }) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let records: Vec<OrderRecord> = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse orders in {}", path.display()))?;

            let orders = InMemoryOrderStore::new(config.filter);
            orders.extend(records);
            tracing::debug!(order_count = orders.len(), "loaded orders from file");
            revenue_chart(SystemClock, config.series, &orders).await?
        }
        ("stock", OrderSourceConfig::Postgres { database_url }) => {
            let orders = PostgresOrderSource::connect(&database_url, config.filter).await?;
            let stock = PostgresStockSource::new(orders.pool().clone());
            let seed = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
            let history = JitteredHistory::new(JitteredHistory::DEFAULT_SPREAD, seed);
            stock_chart(SystemClock, config.series, history, &stock).await?
        }
        ("stock", OrderSourceConfig::File { .. }) => {
            bail!("the stock chart reads current stock from Postgres; set DATABASE_URL")
        }
        (other, _) => bail!("unknown chart {other:?}; expected `revenue` or `stock`"),
    };

    println!("{}", serde_json::to_string_pretty(&buckets)?);
    Ok(())
}

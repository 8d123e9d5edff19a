//! Infrastructure layer: order and stock stores, chart presets, config.

pub mod charts;
pub mod config;
pub mod orders;
pub mod postgres;
pub mod stock;

pub use charts::{ORDERS, REVENUE, STOCK, revenue_chart, revenue_metrics, stock_chart, stock_metrics};
pub use config::{ChartConfig, OrderSourceConfig};
pub use orders::{InMemoryOrderStore, OrderFilter, OrderRecord, OrderStatus};
pub use postgres::{PostgresOrderSource, PostgresStockSource};
pub use stock::{InMemoryStockStore, StockSnapshot};

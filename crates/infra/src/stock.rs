//! Stock snapshots and the in-memory stock store.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_analytics::{EventSource, FetchError, RawEvent};
use storefront_core::ProductId;

use crate::charts::STOCK;

/// Stock on hand for one product at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub product_id: ProductId,
    pub quantity: i64,
    pub recorded_at: DateTime<Utc>,
}

impl RawEvent for StockSnapshot {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "quantity" => Some(self.quantity as f64),
            _ => None,
        }
    }
}

/// In-memory stock store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    snapshots: RwLock<Vec<StockSnapshot>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, snapshot: StockSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.write() {
            snapshots.push(snapshot);
        }
    }

    /// Sum over products of each product's most recent quantity.
    pub fn current_total(&self) -> Result<i64, FetchError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| FetchError::unavailable("stock store lock poisoned"))?;

        let mut latest: HashMap<ProductId, &StockSnapshot> = HashMap::new();
        for snapshot in snapshots.iter() {
            latest
                .entry(snapshot.product_id)
                .and_modify(|seen| {
                    if snapshot.recorded_at >= seen.recorded_at {
                        *seen = snapshot;
                    }
                })
                .or_insert(snapshot);
        }
        latest
            .values()
            .try_fold(0i64, |acc, s| acc.checked_add(s.quantity))
            .ok_or_else(|| FetchError::decode("stock total overflows i64"))
    }
}

#[async_trait::async_trait]
impl EventSource for InMemoryStockStore {
    type Event = StockSnapshot;

    async fn fetch_events(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<StockSnapshot>, FetchError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| FetchError::unavailable("stock store lock poisoned"))?;

        let mut matching: Vec<StockSnapshot> = snapshots
            .iter()
            .filter(|s| s.recorded_at >= window_start && s.recorded_at <= window_end)
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.recorded_at);
        Ok(matching)
    }

    async fn sample_snapshot(&self, metric: &str) -> Result<f64, FetchError> {
        if metric != STOCK {
            return Err(FetchError::Unsupported(metric.to_string()));
        }
        Ok(self.current_total()? as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(product_id: ProductId, quantity: i64, day: u32) -> StockSnapshot {
        StockSnapshot {
            product_id,
            quantity,
            recorded_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn current_total_uses_latest_snapshot_per_product() {
        let store = InMemoryStockStore::new();
        let shoe = ProductId::new();
        let sock = ProductId::new();
        store.record(snapshot(shoe, 40, 2));
        store.record(snapshot(shoe, 10, 1));
        store.record(snapshot(sock, 7, 1));

        assert_eq!(store.current_total().unwrap(), 47);
    }

    #[test]
    fn current_total_reports_overflow() {
        let store = InMemoryStockStore::new();
        store.record(snapshot(ProductId::new(), i64::MAX, 1));
        store.record(snapshot(ProductId::new(), 1, 1));

        assert!(matches!(store.current_total(), Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn sample_snapshot_only_knows_stock() {
        let store = InMemoryStockStore::new();
        store.record(snapshot(ProductId::new(), 12, 1));

        assert_eq!(store.sample_snapshot(STOCK).await.unwrap(), 12.0);
        assert!(matches!(
            store.sample_snapshot("revenue").await,
            Err(FetchError::Unsupported(_))
        ));
    }
}

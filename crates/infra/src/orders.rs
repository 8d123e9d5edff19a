//! Order records and the in-memory order store.

use core::str::FromStr;
use std::collections::BTreeSet;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_analytics::{ConfigError, EventSource, FetchError, RawEvent};
use storefront_core::{CustomerId, DomainError, OrderId};

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses whose orders count toward revenue.
    pub fn counts_as_revenue(self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed | OrderStatus::Shipped | OrderStatus::Delivered
        )
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("unknown order status: {s:?}")))
    }
}

/// An order as the chart engine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

impl RawEvent for OrderRecord {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn field(&self, name: &str) -> Option<f64> {
        match name {
            "amount" => Some(self.total_amount),
            _ => None,
        }
    }
}

/// Which orders feed a chart. Every recognized filter is a field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOrderFilter")]
pub struct OrderFilter {
    /// Only orders in one of these statuses are returned.
    pub statuses: BTreeSet<OrderStatus>,
    /// Restrict to a single customer.
    pub customer_id: Option<CustomerId>,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawOrderFilter {
    statuses: BTreeSet<OrderStatus>,
    customer_id: Option<CustomerId>,
}

impl Default for RawOrderFilter {
    fn default() -> Self {
        let OrderFilter {
            statuses,
            customer_id,
        } = OrderFilter::revenue();
        Self {
            statuses,
            customer_id,
        }
    }
}

impl TryFrom<RawOrderFilter> for OrderFilter {
    type Error = ConfigError;

    fn try_from(raw: RawOrderFilter) -> Result<Self, Self::Error> {
        let filter = Self {
            statuses: raw.statuses,
            customer_id: raw.customer_id,
        };
        filter.validate()?;
        Ok(filter)
    }
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self::revenue()
    }
}

impl OrderFilter {
    /// Confirmed, shipped and delivered orders.
    pub fn revenue() -> Self {
        Self {
            statuses: OrderStatus::ALL
                .into_iter()
                .filter(|s| s.counts_as_revenue())
                .collect(),
            customer_id: None,
        }
    }

    pub fn for_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn matches(&self, order: &OrderRecord) -> bool {
        self.statuses.contains(&order.status)
            && self.customer_id.is_none_or(|c| order.customer_id == Some(c))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.statuses.is_empty() {
            return Err(ConfigError::invalid("statuses", "at least one status is required"));
        }
        Ok(())
    }
}

/// In-memory order store for tests/dev and file-backed runs.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    filter: OrderFilter,
    orders: RwLock<Vec<OrderRecord>>,
}

impl InMemoryOrderStore {
    pub fn new(filter: OrderFilter) -> Self {
        Self {
            filter,
            orders: RwLock::new(Vec::new()),
        }
    }

    pub fn filter(&self) -> &OrderFilter {
        &self.filter
    }

    pub fn insert(&self, order: OrderRecord) {
        if let Ok(mut orders) = self.orders.write() {
            orders.push(order);
        }
    }

    pub fn extend(&self, records: impl IntoIterator<Item = OrderRecord>) {
        if let Ok(mut orders) = self.orders.write() {
            orders.extend(records);
        }
    }

    pub fn len(&self) -> usize {
        self.orders.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl EventSource for InMemoryOrderStore {
    type Event = OrderRecord;

    async fn fetch_events(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, FetchError> {
        let orders = self
            .orders
            .read()
            .map_err(|_| FetchError::unavailable("order store lock poisoned"))?;

        let mut matching: Vec<OrderRecord> = orders
            .iter()
            .filter(|o| o.created_at >= window_start && o.created_at <= window_end)
            .filter(|o| self.filter.matches(o))
            .cloned()
            .collect();
        matching.sort_by_key(|o| o.created_at);
        Ok(matching)
    }
}

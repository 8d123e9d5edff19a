//! Fetch contract between the engine and the data store.

use chrono::{DateTime, Utc};

use crate::error::FetchError;

/// A timestamped business record with named numeric fields.
pub trait RawEvent {
    /// When the event happened (business time).
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Numeric field by name (e.g. `"amount"`, `"quantity"`), if present.
    fn field(&self, name: &str) -> Option<f64>;
}

/// Data store boundary for the bucketing engine.
///
/// Implementations own business filtering (e.g. which order statuses count
/// toward revenue) and must only return events whose timestamp lies in
/// `[window_start, window_end]`.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    type Event: RawEvent + Send;

    async fn fetch_events(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Self::Event>, FetchError>;

    /// Current value of a snapshot-style metric (e.g. total stock on hand).
    ///
    /// Sampled once per aggregation call, not per bucket.
    async fn sample_snapshot(&self, metric: &str) -> Result<f64, FetchError> {
        Err(FetchError::Unsupported(metric.to_string()))
    }
}

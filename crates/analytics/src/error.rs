//! Error types for the bucketing engine and its data sources.

use thiserror::Error;

use crate::granularity::Granularity;

/// Failure reported by an [`EventSource`](crate::source::EventSource).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The backing store could not be reached or rejected the query.
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    /// The source cannot produce a snapshot for this metric.
    #[error("snapshot not supported for metric `{0}`")]
    Unsupported(String),

    /// A row came back in a shape the source could not decode.
    #[error("failed to decode record: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Aggregation failure. No partial series is ever returned alongside one.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Fetching events (or a snapshot) failed. Callers may retry; the engine does not.
    #[error("failed to fetch events: {0}")]
    Fetch(#[from] FetchError),

    /// A series needs at least one bucket.
    #[error("point_count must be positive")]
    InvalidPointCount,

    /// Stepping back `point_count` periods leaves the representable calendar.
    #[error("window of {point_count} {granularity} periods is out of range")]
    WindowOutOfRange {
        granularity: Granularity,
        point_count: usize,
    },
}

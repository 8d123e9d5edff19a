//! Time-series bucketing for the admin revenue and stock charts.
//!
//! Turns irregularly timestamped business events into a fixed-length, gap-free,
//! chronologically ordered series at a chosen [`Granularity`].

pub mod bucket;
pub mod config;
pub mod engine;
pub mod error;
pub mod granularity;
pub mod history;
pub mod metric;
pub mod source;

pub use bucket::Bucket;
pub use config::{ConfigError, DEFAULT_POINT_COUNT, MAX_POINT_COUNT, SeriesConfig};
pub use engine::BucketingEngine;
pub use error::{AggregationError, FetchError};
pub use granularity::{Granularity, InvalidGranularityError};
pub use history::{FlatHistory, HistorySynthesizer, JitteredHistory};
pub use metric::{Aggregation, Metric, MetricSet, MetricValue};
pub use source::{EventSource, RawEvent};

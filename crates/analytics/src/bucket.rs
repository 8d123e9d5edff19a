use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metric::MetricValue;

/// One fixed-width interval of a series and its aggregated metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    /// Inclusive lower bound, truncated to the series granularity.
    pub period_start: DateTime<Utc>,
    pub label: String,
    /// Every metric of the engine's set, in definition order; zero when the bucket is empty.
    pub metric_values: IndexMap<String, MetricValue>,
}

impl Bucket {
    pub fn value(&self, metric: &str) -> Option<MetricValue> {
        self.metric_values.get(metric).copied()
    }

    pub fn amount(&self, metric: &str) -> Option<f64> {
        self.value(metric).map(MetricValue::as_f64)
    }

    pub fn count(&self, metric: &str) -> Option<u64> {
        match self.value(metric)? {
            MetricValue::Count(n) => Some(n),
            MetricValue::Amount(_) => None,
        }
    }
}

//! Metric definitions and per-bucket accumulators.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::history::HistorySynthesizer;
use crate::source::RawEvent;

/// How a metric folds the events of one bucket.
#[derive(Debug, Clone)]
pub enum Aggregation {
    /// Monetary sum of a field. Kept at full precision, rounded to 2 decimals on emission.
    Sum { field: String },
    /// Number of events.
    Count,
    /// Snapshot-style: the field of the bucket's last event in fetch order.
    Last { field: String },
    /// One snapshot sampled per call, spread over the buckets by a synthesizer.
    Synthesized(Arc<dyn HistorySynthesizer>),
}

/// A named aggregate emitted on every bucket.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    aggregation: Aggregation,
}

impl Metric {
    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregation: Aggregation::Sum {
                field: field.into(),
            },
        }
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregation: Aggregation::Count,
        }
    }

    pub fn last(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregation: Aggregation::Last {
                field: field.into(),
            },
        }
    }

    pub fn synthesized(
        name: impl Into<String>,
        synthesizer: impl HistorySynthesizer + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            aggregation: Aggregation::Synthesized(Arc::new(synthesizer)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aggregation(&self) -> &Aggregation {
        &self.aggregation
    }

    pub fn is_synthesized(&self) -> bool {
        matches!(self.aggregation, Aggregation::Synthesized(_))
    }
}

/// Emitted metric value. Counts stay integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Amount(f64),
}

impl MetricValue {
    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Count(n) => n as f64,
            MetricValue::Amount(v) => v,
        }
    }
}

/// Ordered set of metrics an engine computes for every bucket.
#[derive(Debug, Clone, Default)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub(crate) fn empty_slots(&self) -> Vec<Slot> {
        self.metrics
            .iter()
            .map(|m| match m.aggregation {
                Aggregation::Sum { .. } => Slot::Sum(0.0),
                Aggregation::Count => Slot::Count(0),
                Aggregation::Last { .. } => Slot::Last(None),
                Aggregation::Synthesized(_) => Slot::Synthesized,
            })
            .collect()
    }

    pub(crate) fn accumulate<E: RawEvent>(&self, slots: &mut [Slot], event: &E) {
        for (metric, slot) in self.metrics.iter().zip(slots.iter_mut()) {
            match (&metric.aggregation, slot) {
                (Aggregation::Sum { field }, Slot::Sum(total)) => {
                    *total += event.field(field).unwrap_or(0.0);
                }
                (Aggregation::Count, Slot::Count(n)) => *n += 1,
                (Aggregation::Last { field }, Slot::Last(latest)) => {
                    if let Some(value) = event.field(field) {
                        *latest = Some(value);
                    }
                }
                _ => {}
            }
        }
    }

    /// Final values for one bucket.
    ///
    /// `snapshots` is aligned with the metric list (`Some` for synthesized metrics).
    pub(crate) fn finish(
        &self,
        slots: Vec<Slot>,
        snapshots: &[Option<f64>],
        periods_back: usize,
    ) -> IndexMap<String, MetricValue> {
        self.metrics
            .iter()
            .zip(slots)
            .zip(snapshots)
            .map(|((metric, slot), snapshot)| {
                let value = match (&metric.aggregation, slot) {
                    (_, Slot::Sum(total)) => MetricValue::Amount(round_cents(total)),
                    (_, Slot::Count(n)) => MetricValue::Count(n),
                    (_, Slot::Last(latest)) => MetricValue::Amount(latest.unwrap_or(0.0)),
                    (Aggregation::Synthesized(synth), Slot::Synthesized) => MetricValue::Amount(
                        synth.value_at(snapshot.unwrap_or(0.0), periods_back),
                    ),
                    (_, Slot::Synthesized) => MetricValue::Amount(0.0),
                };
                (metric.name.clone(), value)
            })
            .collect()
    }
}

/// Running state of one metric inside one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Slot {
    Sum(f64),
    Count(u64),
    Last(Option<f64>),
    Synthesized,
}

/// Round half away from zero to two decimals.
pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::FlatHistory;
    use chrono::{DateTime, TimeZone, Utc};

    struct Sale {
        at: DateTime<Utc>,
        amount: f64,
    }

    impl RawEvent for Sale {
        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }

        fn field(&self, name: &str) -> Option<f64> {
            (name == "amount").then_some(self.amount)
        }
    }

    fn sale(minute: u32, amount: f64) -> Sale {
        Sale {
            at: Utc.with_ymd_and_hms(2024, 1, 1, 10, minute, 0).unwrap(),
            amount,
        }
    }

    fn metrics() -> MetricSet {
        MetricSet::new()
            .with(Metric::sum("revenue", "amount"))
            .with(Metric::count("orders"))
            .with(Metric::last("latest", "amount"))
            .with(Metric::synthesized("stock", FlatHistory))
    }

    #[test]
    fn empty_slots_emit_identity_values() {
        let set = metrics();
        let values = set.finish(set.empty_slots(), &[None, None, None, Some(0.0)], 0);

        assert_eq!(values["revenue"], MetricValue::Amount(0.0));
        assert_eq!(values["orders"], MetricValue::Count(0));
        assert_eq!(values["latest"], MetricValue::Amount(0.0));
        assert_eq!(values["stock"], MetricValue::Amount(0.0));
        assert_eq!(
            values.keys().collect::<Vec<_>>(),
            vec!["revenue", "orders", "latest", "stock"]
        );
    }

    #[test]
    fn sums_round_once_at_emission() {
        let set = metrics();
        let mut slots = set.empty_slots();
        set.accumulate(&mut slots, &sale(1, 10.005));
        set.accumulate(&mut slots, &sale(2, 10.005));

        let values = set.finish(slots, &[None, None, None, Some(0.0)], 0);
        assert_eq!(values["revenue"], MetricValue::Amount(20.01));
        assert_eq!(values["orders"], MetricValue::Count(2));
    }

    #[test]
    fn last_takes_final_event_in_fetch_order() {
        let set = metrics();
        let mut slots = set.empty_slots();
        set.accumulate(&mut slots, &sale(30, 7.0));
        set.accumulate(&mut slots, &sale(5, 3.0));

        let values = set.finish(slots, &[None, None, None, Some(0.0)], 0);
        assert_eq!(values["latest"], MetricValue::Amount(3.0));
    }

    #[test]
    fn synthesized_uses_snapshot() {
        let set = metrics();
        let values = set.finish(set.empty_slots(), &[None, None, None, Some(42.0)], 3);
        assert_eq!(values["stock"], MetricValue::Amount(42.0));
    }

    #[test]
    fn metric_values_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&vec![MetricValue::Count(3), MetricValue::Amount(1.5)])
            .unwrap();
        assert_eq!(json, "[3,1.5]");
    }
}

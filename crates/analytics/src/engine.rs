//! Bucketing engine: events in, fixed-length gap-free series out.
//!
//! One call:
//! 1. captures `now` once from the injected clock (`window_end`);
//! 2. lays out `point_count` bucket starts ending at `truncate(now)`;
//! 3. fetches `[now - point_count units, now]` from the source exactly once;
//! 4. folds each event into the bucket its truncated timestamp keys to;
//! 5. emits every bucket in chronological order, empty ones at zero.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use storefront_core::{Clock, SystemClock};

use crate::bucket::Bucket;
use crate::error::AggregationError;
use crate::granularity::Granularity;
use crate::metric::{MetricSet, Slot};
use crate::source::{EventSource, RawEvent};

/// Stateless between calls; safe to share and call concurrently.
#[derive(Debug, Clone)]
pub struct BucketingEngine<C = SystemClock> {
    clock: C,
    metrics: MetricSet,
}

impl BucketingEngine<SystemClock> {
    /// Engine on wall-clock time.
    pub fn with_system_clock(metrics: MetricSet) -> Self {
        Self::new(SystemClock, metrics)
    }
}

impl<C: Clock> BucketingEngine<C> {
    pub fn new(clock: C, metrics: MetricSet) -> Self {
        Self { clock, metrics }
    }

    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Aggregate the source's events into exactly `point_count` buckets.
    ///
    /// Events whose truncated timestamp matches no bucket (or that fall outside
    /// the fetch window) are dropped silently. A fetch failure aborts the whole
    /// call; there are no partial results.
    #[tracing::instrument(skip_all, fields(granularity = %granularity, point_count = point_count))]
    pub async fn aggregate<S>(
        &self,
        granularity: Granularity,
        point_count: usize,
        source: &S,
    ) -> Result<Vec<Bucket>, AggregationError>
    where
        S: EventSource + ?Sized,
    {
        if point_count == 0 {
            return Err(AggregationError::InvalidPointCount);
        }
        let out_of_range = || AggregationError::WindowOutOfRange {
            granularity,
            point_count,
        };
        let periods = u32::try_from(point_count).map_err(|_| out_of_range())?;

        let window_end = self.clock.now();
        let window_start = granularity
            .step_back(window_end, periods)
            .ok_or_else(out_of_range)?;
        let starts = skeleton(granularity, window_end, periods).ok_or_else(out_of_range)?;

        let mut index: IndexMap<DateTime<Utc>, Vec<Slot>> = starts
            .into_iter()
            .map(|start| (start, self.metrics.empty_slots()))
            .collect();

        let events = source.fetch_events(window_start, window_end).await?;

        let mut snapshots = Vec::with_capacity(self.metrics.len());
        for metric in self.metrics.iter() {
            if metric.is_synthesized() {
                snapshots.push(Some(source.sample_snapshot(metric.name()).await?));
            } else {
                snapshots.push(None);
            }
        }

        let mut dropped = 0usize;
        for event in &events {
            let at = event.occurred_at();
            if at < window_start || at > window_end {
                dropped += 1;
                continue;
            }
            match index.get_mut(&granularity.truncate(at)) {
                Some(slots) => self.metrics.accumulate(slots, event),
                None => {
                    tracing::trace!(occurred_at = %at, "event matches no bucket; dropped");
                    dropped += 1;
                }
            }
        }

        tracing::debug!(
            %window_start,
            %window_end,
            fetched = events.len(),
            dropped,
            "aggregated series"
        );

        let latest = index.len().saturating_sub(1);
        Ok(index
            .into_iter()
            .enumerate()
            .map(|(position, (period_start, slots))| Bucket {
                period_start,
                label: granularity.label(period_start),
                metric_values: self.metrics.finish(slots, &snapshots, latest - position),
            })
            .collect())
    }
}

/// Bucket starts, oldest first: bucket `i` is `window_end` stepped back
/// `periods - 1 - i` units, then truncated.
pub(crate) fn skeleton(
    granularity: Granularity,
    window_end: DateTime<Utc>,
    periods: u32,
) -> Option<Vec<DateTime<Utc>>> {
    (0..periods)
        .rev()
        .map(|back| {
            granularity
                .step_back(window_end, back)
                .map(|t| granularity.truncate(t))
        })
        .collect()
}

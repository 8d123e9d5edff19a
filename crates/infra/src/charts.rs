//! Admin chart presets: which metrics each chart computes.

use storefront_analytics::{
    AggregationError, Bucket, BucketingEngine, EventSource, HistorySynthesizer, Metric, MetricSet,
    SeriesConfig,
};
use storefront_core::Clock;

pub const REVENUE: &str = "revenue";
pub const ORDERS: &str = "orders";
pub const STOCK: &str = "stock";

/// Revenue (sum of order totals) and order count per bucket.
pub fn revenue_metrics() -> MetricSet {
    MetricSet::new()
        .with(Metric::sum(REVENUE, "amount"))
        .with(Metric::count(ORDERS))
}

/// Total stock per bucket from the current snapshot.
///
/// There is no persisted stock history yet, so past buckets come from the
/// synthesizer. Pass [`storefront_analytics::JitteredHistory`] to mimic the
/// storefront's existing chart, or `FlatHistory` for an honest flat line.
pub fn stock_metrics(synthesizer: impl HistorySynthesizer + 'static) -> MetricSet {
    MetricSet::new().with(Metric::synthesized(STOCK, synthesizer))
}

/// Revenue chart for one configured series.
pub async fn revenue_chart<C, S>(
    clock: C,
    series: SeriesConfig,
    source: &S,
) -> Result<Vec<Bucket>, AggregationError>
where
    C: Clock,
    S: EventSource + ?Sized,
{
    BucketingEngine::new(clock, revenue_metrics())
        .aggregate(series.granularity, series.point_count, source)
        .await
}

/// Stock chart for one configured series.
pub async fn stock_chart<C, S>(
    clock: C,
    series: SeriesConfig,
    synthesizer: impl HistorySynthesizer + 'static,
    source: &S,
) -> Result<Vec<Bucket>, AggregationError>
where
    C: Clock,
    S: EventSource + ?Sized,
{
    BucketingEngine::new(clock, stock_metrics(synthesizer))
        .aggregate(series.granularity, series.point_count, source)
        .await
}

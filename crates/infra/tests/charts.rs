//! End-to-end chart tests against the in-memory stores.

use chrono::{DateTime, TimeZone, Utc};

use storefront_analytics::{FlatHistory, Granularity, JitteredHistory, MetricValue, SeriesConfig};
use storefront_core::{CustomerId, FixedClock, OrderId, ProductId};
use storefront_infra::{
    InMemoryOrderStore, InMemoryStockStore, ORDERS, OrderFilter, OrderRecord, OrderStatus, REVENUE,
    STOCK, StockSnapshot, revenue_chart, stock_chart,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 14, 30, 0).unwrap()
}

fn order(status: OrderStatus, amount: f64, at: DateTime<Utc>) -> OrderRecord {
    OrderRecord {
        id: OrderId::new(),
        customer_id: None,
        status,
        total_amount: amount,
        created_at: at,
    }
}

fn daily(points: usize) -> SeriesConfig {
    SeriesConfig::new(Granularity::Day, points).unwrap()
}

#[tokio::test]
async fn daily_revenue_chart_buckets_orders() {
    let store = InMemoryOrderStore::new(OrderFilter::revenue());
    store.extend([
        order(OrderStatus::Delivered, 50.0, Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap()),
        order(OrderStatus::Confirmed, 20.0, Utc.with_ymd_and_hms(2024, 5, 14, 23, 59, 0).unwrap()),
    ]);

    let buckets = revenue_chart(FixedClock::new(now()), daily(3), &store)
        .await
        .unwrap();

    let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["13/05", "14/05", "15/05"]);

    let revenue: Vec<f64> = buckets.iter().map(|b| b.amount(REVENUE).unwrap()).collect();
    assert_eq!(revenue, vec![0.0, 20.0, 50.0]);

    let orders: Vec<u64> = buckets.iter().map(|b| b.count(ORDERS).unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 1]);
}

#[tokio::test]
async fn pending_and_cancelled_orders_do_not_count() {
    let store = InMemoryOrderStore::new(OrderFilter::revenue());
    let at = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();
    store.extend([
        order(OrderStatus::Shipped, 10.0, at),
        order(OrderStatus::Pending, 100.0, at),
        order(OrderStatus::Cancelled, 1000.0, at),
    ]);

    let buckets = revenue_chart(FixedClock::new(now()), daily(1), &store)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].value(REVENUE), Some(MetricValue::Amount(10.0)));
    assert_eq!(buckets[0].value(ORDERS), Some(MetricValue::Count(1)));
}

#[tokio::test]
async fn customer_filter_limits_the_chart() {
    let customer = CustomerId::new();
    let store = InMemoryOrderStore::new(OrderFilter::revenue().for_customer(customer));
    let at = Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap();

    let mut mine = order(OrderStatus::Delivered, 12.5, at);
    mine.customer_id = Some(customer);
    store.extend([mine, order(OrderStatus::Delivered, 99.0, at)]);

    let buckets = revenue_chart(FixedClock::new(now()), daily(2), &store)
        .await
        .unwrap();

    assert_eq!(buckets[1].amount(REVENUE), Some(12.5));
    assert_eq!(buckets[1].count(ORDERS), Some(1));
}

#[tokio::test]
async fn monthly_chart_spans_year_boundary() {
    let store = InMemoryOrderStore::new(OrderFilter::revenue());
    store.extend([
        order(OrderStatus::Delivered, 0.1, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()),
        order(OrderStatus::Delivered, 0.2, Utc.with_ymd_and_hms(2024, 1, 30, 0, 0, 0).unwrap()),
    ]);

    let series = SeriesConfig::new(Granularity::Month, 6).unwrap();
    let buckets = revenue_chart(FixedClock::new(now()), series, &store)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 6);
    assert_eq!(buckets[0].label, "Dec 23");
    assert_eq!(buckets[5].label, "May 24");
    assert_eq!(buckets[1].amount(REVENUE), Some(0.3));
    assert_eq!(buckets[1].count(ORDERS), Some(2));
}

#[tokio::test]
async fn flat_stock_chart_repeats_current_total() {
    let store = InMemoryStockStore::new();
    store.record(StockSnapshot {
        product_id: ProductId::new(),
        quantity: 42,
        recorded_at: Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap(),
    });

    let buckets = stock_chart(FixedClock::new(now()), daily(7), FlatHistory, &store)
        .await
        .unwrap();

    assert_eq!(buckets.len(), 7);
    assert!(buckets.iter().all(|b| b.amount(STOCK) == Some(42.0)));
}

#[tokio::test]
async fn jittered_stock_chart_ends_on_current_total() {
    let store = InMemoryStockStore::new();
    store.record(StockSnapshot {
        product_id: ProductId::new(),
        quantity: 200,
        recorded_at: Utc.with_ymd_and_hms(2024, 5, 15, 8, 0, 0).unwrap(),
    });

    let history = JitteredHistory::new(0.1, 7);
    let buckets = stock_chart(FixedClock::new(now()), daily(10), history, &store)
        .await
        .unwrap();

    assert_eq!(buckets.last().unwrap().amount(STOCK), Some(200.0));
    for bucket in &buckets {
        let value = bucket.amount(STOCK).unwrap();
        assert!((180.0..=220.0).contains(&value), "{value} outside 10% band");
    }
}

#[tokio::test]
async fn chart_output_serializes_for_the_dashboard() {
    let store = InMemoryOrderStore::new(OrderFilter::revenue());
    store.insert(order(
        OrderStatus::Delivered,
        19.99,
        Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap(),
    ));

    let buckets = revenue_chart(FixedClock::new(now()), daily(1), &store)
        .await
        .unwrap();
    let json = serde_json::to_value(&buckets).unwrap();

    assert_eq!(json[0]["label"], "15/05");
    assert_eq!(json[0]["metric_values"]["revenue"], 19.99);
    assert_eq!(json[0]["metric_values"]["orders"], 1);
}

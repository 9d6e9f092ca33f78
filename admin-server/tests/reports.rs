//! 报表集成测试
//!
//! Transactions are produced through the order lifecycle, the way they are in
//! production.

mod common;

use std::str::FromStr;

use admin_server::AppError;
use admin_server::db::models::TransactionStatus;
use admin_server::db::repository::TransactionRepository;
use admin_server::reports::ReportPeriod;
use admin_server::utils::time::now_millis;
use common::{TestEnv, order_id};
use surrealdb::RecordId;

async fn fulfill(env: &TestEnv, customer: &str, total: f64) {
    let order = env.place_order(Some(customer), customer, total).await;
    env.state
        .lifecycle
        .transition(&order_id(&order), "Picked Up")
        .await
        .unwrap();
}

/// The window ends at "now" (exclusive); step past the last write
async fn tick() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

#[tokio::test]
async fn test_empty_reports() {
    let env = TestEnv::new().await;
    let buckets = env
        .state
        .reports
        .accepted_orders(ReportPeriod::Day)
        .await
        .unwrap();
    assert!(buckets.is_empty());

    let total = env
        .state
        .reports
        .total_collection(ReportPeriod::Month)
        .await
        .unwrap();
    assert_eq!(total.total_amount, 0.0);
}

#[tokio::test]
async fn test_buckets_sum_to_total_for_every_period() {
    let env = TestEnv::new().await;
    fulfill(&env, "Ana", 10.10).await;
    fulfill(&env, "Ben", 20.20).await;
    fulfill(&env, "Cy", 0.30).await;
    tick().await;

    for period in [ReportPeriod::Day, ReportPeriod::Week, ReportPeriod::Month] {
        let buckets = env.state.reports.accepted_orders(period).await.unwrap();
        let count: i64 = buckets.iter().map(|b| b.order_count).sum();
        assert_eq!(count, 3, "period {period}");
        assert!(buckets.windows(2).all(|w| w[0].key < w[1].key));

        let sum: f64 = buckets.iter().map(|b| b.total_amount).sum();
        let sum = (sum * 100.0).round() / 100.0;
        let total = env.state.reports.total_collection(period).await.unwrap();
        assert_eq!(sum, 30.6);
        assert_eq!(total.total_amount, 30.6);
    }
}

#[tokio::test]
async fn test_pending_orders_are_not_counted() {
    let env = TestEnv::new().await;
    fulfill(&env, "Ana", 5.0).await;
    let pending = env.place_order(Some("Ben"), "Ben", 99.0).await;
    env.state
        .lifecycle
        .transition(&order_id(&pending), "Baking")
        .await
        .unwrap();
    tick().await;

    let total = env
        .state
        .reports
        .total_collection(ReportPeriod::Day)
        .await
        .unwrap();
    assert_eq!(total.total_amount, 5.0);
}

/// A completed sale stamped at an arbitrary instant
async fn completed_at(env: &TestEnv, key: &str, created_at: i64, total: f64) {
    env.state
        .get_db()
        .query(
            "CREATE transactions SET orderId = $order_id, userName = 'Window', \
             userEmail = 'window@example.com', totalAmount = $total, status = $status, \
             createdAt = $created_at",
        )
        .bind(("order_id", RecordId::from_table_key("orders", key)))
        .bind(("total", total))
        .bind(("status", TransactionStatus::Completed))
        .bind(("created_at", created_at))
        .await
        .unwrap()
        .check()
        .unwrap();
}

// 2025-01-15T00:00:00-05:00 (New York, EST)
const EPOCH_START_NY: i64 = 1_736_917_200_000;
// 2025-06-01T12:00:00Z
const JUNE_FIRST_NOON: i64 = 1_748_779_200_000;

#[tokio::test]
async fn test_window_starts_at_epoch_midnight_in_business_timezone() {
    let env = TestEnv::with_vars(&[
        ("REPORT_EPOCH", "2025-01-15"),
        ("BUSINESS_TIMEZONE", "America/New_York"),
    ])
    .await;

    // before the epoch
    completed_at(&env, "before", EPOCH_START_NY - 1, 100.0).await;
    // UTC is already on the 15th, New York is still on the 14th
    completed_at(&env, "utc-only", EPOCH_START_NY - 2 * 3_600_000, 200.0).await;
    // exactly at the epoch: included
    completed_at(&env, "at", EPOCH_START_NY, 1.25).await;
    completed_at(&env, "june", JUNE_FIRST_NOON, 2.5).await;
    // not yet happened: the window ends at now
    completed_at(&env, "future", now_millis() + 86_400_000, 1000.0).await;

    let (start, end) = env.state.reports.window();
    assert_eq!(start, EPOCH_START_NY);
    assert!(end <= now_millis());

    let buckets = env
        .state
        .reports
        .accepted_orders(ReportPeriod::Day)
        .await
        .unwrap();
    let keys: Vec<&str> = buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["2025-01-15", "2025-06-01"]);
    assert_eq!(buckets.iter().map(|b| b.order_count).sum::<i64>(), 2);

    let total = env
        .state
        .reports
        .total_collection(ReportPeriod::Day)
        .await
        .unwrap();
    assert_eq!(total.total_amount, 3.75);
}

#[tokio::test]
async fn test_window_upper_bound_is_exclusive() {
    let env = TestEnv::with_vars(&[("REPORT_EPOCH", "2025-01-15")]).await;
    let (_, end) = env.state.reports.window();

    let transactions = TransactionRepository::new(env.state.get_db());
    completed_at(&env, "at-end", end, 9.0).await;
    completed_at(&env, "just-before", end - 1, 4.0).await;

    let found = transactions.find_in_window(end - 10, end).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].total_amount, 4.0);
}

#[test]
fn test_bogus_period_is_invalid_argument() {
    let err = ReportPeriod::from_str("bogus").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

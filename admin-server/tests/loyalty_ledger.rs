//! 会员积分集成测试

mod common;

use admin_server::AppError;
use admin_server::db::models::LoyaltyStatus;
use admin_server::db::models::serde_helpers::record_key;
use common::TestEnv;

#[tokio::test]
async fn test_first_fulfilled_order_creates_record_with_defaults() {
    let env = TestEnv::new().await;
    let record = env
        .state
        .loyalty
        .record_fulfilled_order("cust-1", "Ana")
        .await
        .unwrap();

    assert_eq!(record.user_id, "cust-1");
    assert_eq!(record.user_name, "Ana");
    assert_eq!(record.order_count, 1);
    assert!(!record.special_offer_eligible);
    assert_eq!(record.status, LoyaltyStatus::NotActive);
    let id = record.id.unwrap();
    assert_eq!(id.table(), "loyalties");
    assert_eq!(record_key(&id), "cust-1");
}

#[tokio::test]
async fn test_count_is_monotonic_and_name_follows_latest() {
    let env = TestEnv::new().await;
    let ledger = &env.state.loyalty;

    let mut last = 0;
    for name in ["Ana", "Ana B.", "Ana Bakes"] {
        let record = ledger.record_fulfilled_order("cust-2", name).await.unwrap();
        assert!(record.order_count > last);
        last = record.order_count;
        assert_eq!(record.user_name, name);
    }
    assert_eq!(last, 3);

    // one record per customer
    assert_eq!(ledger.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_blank_customer_id_is_rejected() {
    let env = TestEnv::new().await;
    let err = env
        .state
        .loyalty
        .record_fulfilled_order("   ", "Nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_reset_keeps_eligibility() {
    let env = TestEnv::new().await;
    let ledger = &env.state.loyalty;

    for _ in 0..10 {
        ledger.record_fulfilled_order("cust-3", "Cy").await.unwrap();
    }

    let reset = ledger.reset_count("cust-3").await.unwrap();
    assert_eq!(reset.order_count, 0);
    assert!(reset.special_offer_eligible);

    let next = ledger.record_fulfilled_order("cust-3", "Cy").await.unwrap();
    assert_eq!(next.order_count, 1);
    assert!(next.special_offer_eligible);
}

#[tokio::test]
async fn test_activation_requires_threshold() {
    let env = TestEnv::new().await;
    let ledger = &env.state.loyalty;

    for _ in 0..9 {
        ledger.record_fulfilled_order("cust-4", "Dee").await.unwrap();
    }
    let err = ledger.toggle_status("loyalties:cust-4").await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));
    assert_eq!(err.status_code(), http::StatusCode::UNPROCESSABLE_ENTITY);

    ledger.record_fulfilled_order("cust-4", "Dee").await.unwrap();
    let active = ledger.toggle_status("cust-4").await.unwrap();
    assert_eq!(active.status, LoyaltyStatus::Active);

    // deactivation is always allowed, even after a reset
    ledger.reset_count("cust-4").await.unwrap();
    let inactive = ledger.toggle_status("cust-4").await.unwrap();
    assert_eq!(inactive.status, LoyaltyStatus::NotActive);
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let env = TestEnv::new().await;
    let ledger = &env.state.loyalty;

    assert!(matches!(
        ledger.toggle_status("nobody").await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        ledger.reset_count("nobody").await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

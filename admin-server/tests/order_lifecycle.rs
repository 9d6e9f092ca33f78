//! 订单状态变更集成测试
//!
//! Real embedded database, recording mailer.

mod common;

use admin_server::AppError;
use admin_server::db::models::{OrderStatus, TransactionStatus};
use admin_server::db::repository::{LoyaltyRepository, OrderRepository, TransactionRepository};
use common::{TestEnv, order_id};

#[tokio::test]
async fn test_picked_up_creates_one_completed_transaction() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-ana"), "Ana", 42.5).await;
    let id = order_id(&order);

    let outcome = env
        .state
        .lifecycle
        .transition(&id, "Picked Up")
        .await
        .unwrap();

    assert!(outcome.fulfilled());
    assert_eq!(outcome.previous, OrderStatus::Pending);
    assert_eq!(outcome.order.status, OrderStatus::PickedUp);

    let txs = TransactionRepository::new(env.state.get_db())
        .find_by_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Completed);
    assert_eq!(txs[0].total_amount, 42.5);
    assert_eq!(txs[0].user_name, "Ana");
    assert_eq!(txs[0].user_email, "ana@example.com");

    let stored = OrderRepository::new(env.state.get_db())
        .find_by_id(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::PickedUp);
}

#[tokio::test]
async fn test_repeated_picked_up_is_not_a_second_fulfillment() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-ben"), "Ben", 10.0).await;
    let id = order_id(&order);

    env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    let again = env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    assert!(!again.fulfilled());
    assert_eq!(again.previous, OrderStatus::PickedUp);

    let txs = TransactionRepository::new(env.state.get_db())
        .find_by_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);

    let loyalty = LoyaltyRepository::new(env.state.get_db())
        .find_by_customer("cust-ben")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loyalty.order_count, 1);
}

#[tokio::test]
async fn test_leaving_and_reentering_picked_up_fulfills_again() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-cy"), "Cy", 7.25).await;
    let id = order_id(&order);

    env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    env.state.lifecycle.transition(&id, "Ready for Pickup").await.unwrap();
    let outcome = env.state.lifecycle.transition(&id, "picked up").await.unwrap();
    assert!(outcome.fulfilled());

    let txs = TransactionRepository::new(env.state.get_db())
        .find_by_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(txs.len(), 2);
}

#[tokio::test]
async fn test_unknown_status_is_rejected_and_order_unchanged() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-dee"), "Dee", 5.0).await;
    let id = order_id(&order);

    let err = env
        .state
        .lifecycle
        .transition(&id, "Delivered")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);

    let stored = OrderRepository::new(env.state.get_db())
        .find_by_id(&id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let env = TestEnv::new().await;
    let err = env
        .state
        .lifecycle
        .transition("orders:doesnotexist", "Baking")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_non_fulfillment_statuses_have_no_side_effects() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-eve"), "Eve", 12.0).await;
    let id = order_id(&order);

    for status in ["Baking", "Ready for Pickup", "Canceled", "Pending"] {
        let outcome = env.state.lifecycle.transition(&id, status).await.unwrap();
        assert!(!outcome.fulfilled());
        assert!(outcome.loyalty.is_none());
    }

    let txs = TransactionRepository::new(env.state.get_db())
        .find_all()
        .await
        .unwrap();
    assert!(txs.is_empty());
    let loyalty = LoyaltyRepository::new(env.state.get_db())
        .find_by_customer("cust-eve")
        .await
        .unwrap();
    assert!(loyalty.is_none());
}

#[tokio::test]
async fn test_every_transition_notifies_the_customer() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-fay"), "Fay", 20.0).await;
    let id = order_id(&order);

    env.state.lifecycle.transition(&id, "Baking").await.unwrap();
    env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    env.settle().await;

    let sent = env.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.to == "fay@example.com"));
    let subjects: Vec<&str> = sent.iter().map(|m| m.subject.as_str()).collect();
    assert!(subjects.contains(&"Order Baking In Progress"));
    assert!(subjects.contains(&"Order Completed"));
}

#[tokio::test]
async fn test_mail_failure_does_not_fail_the_transition() {
    let env = TestEnv::with_failing_mailer().await;
    let order = env.place_order(Some("cust-gus"), "Gus", 30.0).await;
    let id = order_id(&order);

    let outcome = env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    env.settle().await;

    assert!(outcome.fulfilled());
    assert_eq!(outcome.loyalty.unwrap().order_count, 1);
}

#[tokio::test]
async fn test_order_without_customer_id_skips_loyalty() {
    let env = TestEnv::new().await;
    let order = env.place_order(None, "Walk In", 9.0).await;
    let id = order_id(&order);

    let outcome = env.state.lifecycle.transition(&id, "Picked Up").await.unwrap();
    assert!(outcome.fulfilled());
    assert!(outcome.loyalty.is_none());

    let all = env.state.loyalty.list().await.unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_tenth_fulfilled_order_latches_special_offer() {
    let env = TestEnv::new().await;

    for _ in 0..9 {
        env.state
            .loyalty
            .record_fulfilled_order("cust-a", "A")
            .await
            .unwrap();
    }
    let before = LoyaltyRepository::new(env.state.get_db())
        .find_by_customer("cust-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before.order_count, 9);
    assert!(!before.special_offer_eligible);

    let order = env.place_order(Some("cust-a"), "A", 18.0).await;
    let outcome = env
        .state
        .lifecycle
        .transition(&order_id(&order), "Picked Up")
        .await
        .unwrap();

    let tx = outcome.transaction.unwrap();
    assert_eq!(tx.status, TransactionStatus::Completed);
    let loyalty = outcome.loyalty.unwrap();
    assert_eq!(loyalty.order_count, 10);
    assert!(loyalty.special_offer_eligible);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transitions_last_write_wins() {
    let env = TestEnv::new().await;

    for round in 0..20 {
        let order = env.place_order(Some("cust-hal"), "Hal", 3.0).await;
        let id = order_id(&order);

        let a = env.state.lifecycle.clone();
        let b = env.state.lifecycle.clone();
        let (id_a, id_b) = (id.clone(), id.clone());
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.transition(&id_a, "Baking").await }),
            tokio::spawn(async move { b.transition(&id_b, "Canceled").await }),
        );
        assert!(ra.unwrap().is_ok(), "round {round}: Baking failed");
        assert!(rb.unwrap().is_ok(), "round {round}: Canceled failed");

        let stored = OrderRepository::new(env.state.get_db())
            .find_by_id(&id)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(stored.status, OrderStatus::Baking | OrderStatus::Canceled));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_pickups_of_one_order_fulfill_once() {
    let env = TestEnv::new().await;
    let order = env.place_order(Some("cust-ivy"), "Ivy", 12.0).await;
    let id = order_id(&order);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lifecycle = env.state.lifecycle.clone();
            let id = id.clone();
            tokio::spawn(async move { lifecycle.transition(&id, "Picked Up").await })
        })
        .collect();

    let mut fulfilled = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.fulfilled() {
            fulfilled += 1;
        }
    }
    assert_eq!(fulfilled, 1);

    let txs = TransactionRepository::new(env.state.get_db())
        .find_by_order(order.id.clone().unwrap())
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);

    let record = LoyaltyRepository::new(env.state.get_db())
        .find_by_customer("cust-ivy")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.order_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_pickups_for_one_customer_count_every_order() {
    let env = TestEnv::new().await;
    let mut ids = Vec::new();
    for n in 0..6 {
        let order = env.place_order(Some("cust-jo"), "Jo", 5.0 + n as f64).await;
        ids.push(order_id(&order));
    }

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let lifecycle = env.state.lifecycle.clone();
            tokio::spawn(async move { lifecycle.transition(&id, "Picked Up").await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(outcome.fulfilled());
    }

    let completed = TransactionRepository::new(env.state.get_db())
        .find_all()
        .await
        .unwrap();
    assert_eq!(completed.len(), ids.len());

    let record = LoyaltyRepository::new(env.state.get_db())
        .find_by_customer("cust-jo")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.order_count, ids.len() as i64);
}

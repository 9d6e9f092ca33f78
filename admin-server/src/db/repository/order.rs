//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id, retry_on_conflict};
use crate::db::models::{Order, OrderCreate, OrderStatus};
use crate::utils::time::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Resolve a path id into an order record id
    pub fn thing(id: &str) -> RepoResult<RecordId> {
        parse_record_id(TABLE, id)
    }

    /// All orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM orders ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = Self::thing(id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Checkout: new orders always start as `Pending`
    pub async fn create(&self, data: OrderCreate) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE orders SET
                    userId = $user_id,
                    userName = $user_name,
                    userEmail = $user_email,
                    cartItems = $cart_items,
                    totalAmount = $total_amount,
                    pickupDateTime = $pickup_date_time,
                    paymentMethod = $payment_method,
                    status = $status,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("user_id", data.user_id))
            .bind(("user_name", data.user_name))
            .bind(("user_email", data.user_email))
            .bind(("cart_items", data.cart_items))
            .bind(("total_amount", data.total_amount))
            .bind(("pickup_date_time", data.pickup_date_time))
            .bind(("payment_method", data.payment_method))
            .bind(("status", OrderStatus::Pending))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Order> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Write the new status and return the order as it was before the write
    ///
    /// Reading the previous state in the same statement keeps two concurrent
    /// confirmations from both observing the pre-fulfillment status. A write
    /// that loses the race is run again, so the last one to commit wins.
    pub async fn replace_status(&self, thing: RecordId, status: OrderStatus) -> RepoResult<Order> {
        let db = self.base.db();
        let before = retry_on_conflict("order.replace_status", || {
            let thing = thing.clone();
            async move {
                let mut result = db
                    .query("UPDATE $thing SET status = $status RETURN BEFORE")
                    .bind(("thing", thing))
                    .bind(("status", status))
                    .await?;
                Ok::<_, RepoError>(result.take::<Option<Order>>(0)?)
            }
        })
        .await?;

        before.ok_or_else(|| RepoError::NotFound(format!("Order {} not found", thing)))
    }
}

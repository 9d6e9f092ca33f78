//! Transaction Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, Transaction, TransactionStatus};
use crate::utils::time::now_millis;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record a completed sale for a fulfilled order
    pub async fn create_completed(&self, order_id: RecordId, order: &Order) -> RepoResult<Transaction> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE transactions SET
                    orderId = $order_id,
                    userName = $user_name,
                    userEmail = $user_email,
                    totalAmount = $total_amount,
                    status = $status,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("order_id", order_id))
            .bind(("user_name", order.user_name.clone()))
            .bind(("user_email", order.user_email.clone()))
            .bind(("total_amount", order.total_amount))
            .bind(("status", TransactionStatus::Completed))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Transaction> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create transaction".to_string()))
    }

    /// All transactions, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Transaction>> {
        let transactions: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM transactions ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(transactions)
    }

    /// Transactions with `start <= createdAt < end` (Unix millis)
    pub async fn find_in_window(&self, start: i64, end: i64) -> RepoResult<Vec<Transaction>> {
        let transactions: Vec<Transaction> = self
            .base
            .db()
            .query(
                "SELECT * FROM transactions WHERE createdAt >= $start AND createdAt < $end \
                 ORDER BY createdAt",
            )
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(transactions)
    }

    pub async fn find_by_order(&self, order_id: RecordId) -> RepoResult<Vec<Transaction>> {
        let transactions: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM transactions WHERE orderId = $order_id ORDER BY createdAt")
            .bind(("order_id", order_id))
            .await?
            .take(0)?;
        Ok(transactions)
    }
}

//! Loyalty Repository
//!
//! Records are keyed by customer id (`loyalties:<userId>`), so upsert is the
//! only way one comes into existence.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id, retry_on_conflict};
use crate::db::models::{LoyaltyRecord, LoyaltyStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const TABLE: &str = "loyalties";

#[derive(Clone)]
pub struct LoyaltyRepository {
    base: BaseRepository,
}

impl LoyaltyRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record id for a customer
    pub fn thing_for_customer(user_id: &str) -> RecordId {
        RecordId::from_table_key(TABLE, user_id)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<LoyaltyRecord>> {
        let records: Vec<LoyaltyRecord> = self
            .base
            .db()
            .query("SELECT * FROM loyalties ORDER BY orderCount DESC, userName")
            .await?
            .take(0)?;
        Ok(records)
    }

    /// Accepts `loyalties:<key>` or a bare customer id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<LoyaltyRecord>> {
        let thing = parse_record_id(TABLE, id)?;
        let record: Option<LoyaltyRecord> = self.base.db().select(thing).await?;
        Ok(record)
    }

    pub async fn find_by_customer(&self, user_id: &str) -> RepoResult<Option<LoyaltyRecord>> {
        let record: Option<LoyaltyRecord> =
            self.base.db().select(Self::thing_for_customer(user_id)).await?;
        Ok(record)
    }

    /// Create-or-increment in one statement
    ///
    /// The name is overwritten with the latest one seen; eligibility and status
    /// keep their stored values and default on first insert. Concurrent
    /// increments for one customer are serialized by rerunning the loser.
    pub async fn increment(&self, user_id: &str, user_name: &str) -> RepoResult<LoyaltyRecord> {
        let db = self.base.db();
        let thing = Self::thing_for_customer(user_id);
        let record = retry_on_conflict("loyalty.increment", || {
            let thing = thing.clone();
            let user_id = user_id.to_string();
            let user_name = user_name.to_string();
            async move {
                let mut result = db
                    .query(
                        r#"UPSERT $thing SET
                            userId = $user_id,
                            userName = $user_name,
                            orderCount = (orderCount OR 0) + 1,
                            specialOfferEligible = specialOfferEligible OR false,
                            status = status OR $default_status
                        RETURN AFTER"#,
                    )
                    .bind(("thing", thing))
                    .bind(("user_id", user_id))
                    .bind(("user_name", user_name))
                    .bind(("default_status", LoyaltyStatus::NotActive))
                    .await?;
                Ok::<_, RepoError>(result.take::<Option<LoyaltyRecord>>(0)?)
            }
        })
        .await?;

        record.ok_or_else(|| RepoError::Database(format!("Failed to upsert loyalty for {}", user_id)))
    }

    /// Set the eligibility flag; it is never cleared
    pub async fn latch_eligibility(&self, thing: RecordId) -> RepoResult<LoyaltyRecord> {
        self.update_one(
            "loyalty.latch_eligibility",
            "UPDATE $thing SET specialOfferEligible = true RETURN AFTER",
            thing,
            None,
        )
        .await
    }

    pub async fn set_status(&self, thing: RecordId, status: LoyaltyStatus) -> RepoResult<LoyaltyRecord> {
        self.update_one(
            "loyalty.set_status",
            "UPDATE $thing SET status = $status RETURN AFTER",
            thing,
            Some(status),
        )
        .await
    }

    /// Zero the counter; eligibility is left as is
    pub async fn reset_count(&self, id: &str) -> RepoResult<LoyaltyRecord> {
        let thing = parse_record_id(TABLE, id)?;
        self.update_one(
            "loyalty.reset_count",
            "UPDATE $thing SET orderCount = 0 RETURN AFTER",
            thing,
            None,
        )
        .await
    }

    /// Single-record UPDATE, rerun on write conflicts; missing record is NotFound
    async fn update_one(
        &self,
        label: &str,
        sql: &'static str,
        thing: RecordId,
        status: Option<LoyaltyStatus>,
    ) -> RepoResult<LoyaltyRecord> {
        let db = self.base.db();
        let record = retry_on_conflict(label, || {
            let thing = thing.clone();
            async move {
                let mut query = db.query(sql).bind(("thing", thing));
                if let Some(status) = status {
                    query = query.bind(("status", status));
                }
                let mut result = query.await?;
                Ok::<_, RepoError>(result.take::<Option<LoyaltyRecord>>(0)?)
            }
        })
        .await?;

        record.ok_or_else(|| RepoError::NotFound(format!("Loyalty record {} not found", thing)))
    }
}

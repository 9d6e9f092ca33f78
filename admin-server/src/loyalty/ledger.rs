//! Loyalty ledger
//!
//! Counts fulfilled orders per customer and latches special-offer
//! eligibility once the count reaches [`SPECIAL_OFFER_THRESHOLD`].

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{LoyaltyRecord, LoyaltyStatus, SPECIAL_OFFER_THRESHOLD};
use crate::db::repository::{LoyaltyRepository, parse_record_id};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct LoyaltyLedger {
    repo: LoyaltyRepository,
}

impl LoyaltyLedger {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: LoyaltyRepository::new(db),
        }
    }

    /// One more fulfilled order for this customer
    ///
    /// Creates the record on first use. The increment is a single upsert; the
    /// eligibility latch is a second write and is only attempted when needed.
    pub async fn record_fulfilled_order(
        &self,
        user_id: &str,
        user_name: &str,
    ) -> AppResult<LoyaltyRecord> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("userId is required"));
        }

        let record = self.repo.increment(user_id, user_name).await?;

        if !record.needs_eligibility_latch() {
            return Ok(record);
        }

        let thing = LoyaltyRepository::thing_for_customer(user_id);
        let record = self.repo.latch_eligibility(thing).await?;
        tracing::info!(
            user_id = %user_id,
            order_count = record.order_count,
            "Customer reached special offer threshold"
        );
        Ok(record)
    }

    /// Flip active / not active
    ///
    /// Activation requires the threshold to have been reached; deactivation
    /// is always allowed.
    pub async fn toggle_status(&self, id: &str) -> AppResult<LoyaltyRecord> {
        let thing = parse_record_id("loyalties", id)?;
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loyalty record {} not found", id)))?;

        let next = record.status.toggled();
        if next == LoyaltyStatus::Active && !record.reached_threshold() {
            return Err(AppError::business_rule(format!(
                "Loyalty can only be activated after {} orders (current: {})",
                SPECIAL_OFFER_THRESHOLD, record.order_count
            )));
        }

        let updated = self.repo.set_status(thing, next).await?;
        tracing::info!(id = %id, status = next.as_str(), "Loyalty status changed");
        Ok(updated)
    }

    /// Zero the counter, keeping eligibility
    pub async fn reset_count(&self, id: &str) -> AppResult<LoyaltyRecord> {
        let record = self.repo.reset_count(id).await?;
        tracing::info!(id = %id, "Loyalty order count reset");
        Ok(record)
    }

    pub async fn list(&self) -> AppResult<Vec<LoyaltyRecord>> {
        Ok(self.repo.find_all().await?)
    }
}

//! Order status transitions
//!
//! The single place where an order changes status. Entering `Picked Up`
//! from any other status is the fulfillment event: a completed transaction is
//! written and the customer's loyalty counter moves.
//!
//! Effects run in this order and are not rolled back if a later one fails:
//!
//! 1. persist the new status
//! 2. (fulfillment) create the transaction
//! 3. (fulfillment) record the order in the loyalty ledger
//! 4. hand the status email to a background task

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{LoyaltyRecord, Order, OrderStatus, Transaction};
use crate::db::repository::{OrderRepository, TransactionRepository};
use crate::loyalty::LoyaltyLedger;
use crate::orders::notification;
use crate::services::email::{self, SharedMailer};
use crate::utils::{AppError, AppResult};

/// Result of a status change
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The order with its new status
    pub order: Order,
    pub previous: OrderStatus,
    /// Set only on a fulfillment event
    pub transaction: Option<Transaction>,
    /// Set only on a fulfillment event for an order with a customer id
    pub loyalty: Option<LoyaltyRecord>,
}

impl TransitionOutcome {
    pub fn fulfilled(&self) -> bool {
        self.transaction.is_some()
    }
}

#[derive(Clone)]
pub struct OrderLifecycle {
    orders: OrderRepository,
    transactions: TransactionRepository,
    ledger: LoyaltyLedger,
    mailer: SharedMailer,
    bakery_name: String,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>, mailer: SharedMailer, bakery_name: impl Into<String>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            ledger: LoyaltyLedger::new(db),
            mailer,
            bakery_name: bakery_name.into(),
        }
    }

    /// Move an order to `status` (any status may follow any other)
    pub async fn transition(&self, id: &str, status: &str) -> AppResult<TransitionOutcome> {
        let next: OrderStatus = status
            .trim()
            .parse()
            .map_err(|e: crate::db::models::UnknownStatus| AppError::validation(e.to_string()))?;
        let thing = OrderRepository::thing(id)?;

        let mut order = self.orders.replace_status(thing.clone(), next).await?;
        let previous = order.status;
        order.status = next;

        tracing::info!(
            order_id = %thing,
            from = previous.as_str(),
            to = next.as_str(),
            "Order status changed"
        );

        let mut outcome = TransitionOutcome {
            order,
            previous,
            transaction: None,
            loyalty: None,
        };

        if next.fulfills_from(previous) {
            let transaction = self
                .transactions
                .create_completed(thing.clone(), &outcome.order)
                .await?;
            tracing::info!(
                order_id = %thing,
                amount = outcome.order.total_amount,
                "Transaction recorded for fulfilled order"
            );
            outcome.transaction = Some(transaction);

            match outcome.order.user_id.as_deref().map(str::trim) {
                Some(user_id) if !user_id.is_empty() => {
                    let record = self
                        .ledger
                        .record_fulfilled_order(user_id, &outcome.order.user_name)
                        .await?;
                    outcome.loyalty = Some(record);
                }
                _ => {
                    tracing::warn!(order_id = %thing, "Fulfilled order has no customer id, loyalty skipped");
                }
            }
        } else if next == OrderStatus::PickedUp {
            tracing::debug!(order_id = %thing, "Order already picked up, no fulfillment side effects");
        }

        match notification::compose(&outcome.order, &self.bakery_name) {
            Ok(message) => {
                email::dispatch(self.mailer.clone(), message);
            }
            Err(e) => {
                tracing::warn!(order_id = %thing, error = %e, "Status email not rendered, skipped");
            }
        }

        Ok(outcome)
    }
}

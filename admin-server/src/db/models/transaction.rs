//! Transaction Model
//!
//! Written once when an order is fulfilled; reports only read it.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::{OrderId, serde_helpers};

/// Transaction ID type
pub type TransactionId = RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
}

/// Transaction document
///
/// Name, email and amount are copies taken at fulfillment time and are not
/// kept in sync with the order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<TransactionId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order_id: OrderId,
    pub user_name: String,
    pub user_email: String,
    pub total_amount: f64,
    #[serde(default)]
    pub status: TransactionStatus,
    /// Unix millis, set once at creation
    pub created_at: i64,
}

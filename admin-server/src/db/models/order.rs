//! Order Model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order ID type
pub type OrderId = RecordId;

/// Order status
///
/// Any status may follow any other; only entering `PickedUp` carries side
/// effects (see [`crate::orders::OrderLifecycle`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Baking,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    /// The fulfillment status. `"picked up"` is an accepted legacy spelling.
    #[serde(rename = "Picked Up", alias = "picked up")]
    PickedUp,
    Canceled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Baking,
        OrderStatus::ReadyForPickup,
        OrderStatus::PickedUp,
        OrderStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Baking => "Baking",
            OrderStatus::ReadyForPickup => "Ready for Pickup",
            OrderStatus::PickedUp => "Picked Up",
            OrderStatus::Canceled => "Canceled",
        }
    }

    /// Whether moving from `previous` to `self` is a fulfillment event.
    ///
    /// Re-applying `PickedUp` to an order that is already picked up is not.
    pub fn fulfills_from(self, previous: OrderStatus) -> bool {
        self == OrderStatus::PickedUp && previous != OrderStatus::PickedUp
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "picked up" {
            return Ok(OrderStatus::PickedUp);
        }
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Line item, insertion order preserved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub title: String,
    pub price: f64,
}

/// Order document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    /// Customer identity, the loyalty key
    #[serde(default)]
    pub user_id: Option<String>,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    pub total_amount: f64,
    pub pickup_date_time: String,
    pub payment_method: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: i64,
}

impl Order {
    /// Last 4 characters of the record key, as printed in customer emails
    pub fn short_id(&self) -> String {
        let key = self
            .id
            .as_ref()
            .map(serde_helpers::record_key)
            .unwrap_or_default();
        let chars: Vec<char> = key.chars().collect();
        let start = chars.len().saturating_sub(4);
        chars[start..].iter().collect()
    }
}

/// Checkout payload (written by the storefront)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(default)]
    pub user_id: Option<String>,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
    pub total_amount: f64,
    pub pickup_date_time: String,
    pub payment_method: String,
}

/// Status change request `{ "status": "Baking" }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: String,
}

//! Loyalty Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

/// Loyalty record ID type (`loyalties:<customer id>`)
pub type LoyaltyId = RecordId;

/// Fulfilled orders needed before a customer qualifies for the special offer
pub const SPECIAL_OFFER_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoyaltyStatus {
    #[serde(rename = "active")]
    Active,
    #[default]
    #[serde(rename = "not active")]
    NotActive,
}

impl LoyaltyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyStatus::Active => "active",
            LoyaltyStatus::NotActive => "not active",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LoyaltyStatus::Active => LoyaltyStatus::NotActive,
            LoyaltyStatus::NotActive => LoyaltyStatus::Active,
        }
    }
}

/// Per-customer loyalty record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyRecord {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<LoyaltyId>,
    pub user_id: String,
    /// Last name seen for this customer
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub order_count: i64,
    /// One-way latch, never cleared automatically
    #[serde(default, deserialize_with = "serde_helpers::bool_false")]
    pub special_offer_eligible: bool,
    #[serde(default)]
    pub status: LoyaltyStatus,
}

impl LoyaltyRecord {
    pub fn reached_threshold(&self) -> bool {
        self.order_count >= SPECIAL_OFFER_THRESHOLD
    }

    /// Eligibility must be latched on: threshold reached but flag still off
    pub fn needs_eligibility_latch(&self) -> bool {
        self.reached_threshold() && !self.special_offer_eligible
    }
}

/// `POST /loyalty/update` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyUpdate {
    pub user_id: String,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(order_count: i64, eligible: bool) -> LoyaltyRecord {
        LoyaltyRecord {
            id: None,
            user_id: "cust-1".into(),
            user_name: "Ana".into(),
            order_count,
            special_offer_eligible: eligible,
            status: LoyaltyStatus::NotActive,
        }
    }

    #[test]
    fn test_latch_rule() {
        assert!(!record(9, false).needs_eligibility_latch());
        assert!(record(10, false).needs_eligibility_latch());
        assert!(record(15, false).needs_eligibility_latch());
        assert!(!record(10, true).needs_eligibility_latch());
        // reset count keeps the latch; nothing to do
        assert!(!record(0, true).needs_eligibility_latch());
    }

    #[test]
    fn test_status_toggle_and_wire_names() {
        assert_eq!(LoyaltyStatus::NotActive.toggled(), LoyaltyStatus::Active);
        assert_eq!(LoyaltyStatus::Active.toggled(), LoyaltyStatus::NotActive);
        assert_eq!(
            serde_json::to_value(LoyaltyStatus::NotActive).unwrap(),
            "not active"
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let rec: LoyaltyRecord =
            serde_json::from_str(r#"{"userId":"cust-9","orderCount":3}"#).unwrap();
        assert!(!rec.special_offer_eligible);
        assert_eq!(rec.status, LoyaltyStatus::NotActive);
        assert_eq!(rec.user_name, "");
    }
}

//! Loyalty programme

pub mod ledger;

pub use ledger::LoyaltyLedger;

//! Database Models

// Serde helpers
pub mod serde_helpers;

// Accounts
pub mod admin;
pub mod user;

// Catalogue
pub mod item;

// Orders
pub mod order;
pub mod transaction;

// Loyalty
pub mod loyalty;

// Re-exports
pub use admin::{Admin, AdminId, AdminInfo, AdminRegister, LoginRequest, LoginResponse};
pub use item::{CategoryQuantity, Item, ItemCreate, ItemId, ItemUpdate};
pub use loyalty::{LoyaltyId, LoyaltyRecord, LoyaltyStatus, LoyaltyUpdate, SPECIAL_OFFER_THRESHOLD};
pub use order::{CartItem, Order, OrderCreate, OrderId, OrderStatus, OrderStatusUpdate, UnknownStatus};
pub use transaction::{Transaction, TransactionId, TransactionStatus};
pub use user::{AuthType, User, UserCreate, UserId, UserUpdate};

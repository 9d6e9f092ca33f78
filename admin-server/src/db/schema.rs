//! Schema definition
//!
//! Tables are schemaless; only the indexes the queries rely on are declared.
//! Every statement is idempotent so it runs on every startup.

pub const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS admins SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_admins_email ON admins FIELDS email UNIQUE;
DEFINE INDEX IF NOT EXISTS idx_admins_name ON admins FIELDS name;

DEFINE TABLE IF NOT EXISTS items SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_items_category ON items FIELDS category;

DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_users_email ON users FIELDS email;

DEFINE TABLE IF NOT EXISTS orders SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_orders_created ON orders FIELDS createdAt;

DEFINE TABLE IF NOT EXISTS transactions SCHEMALESS;
DEFINE INDEX IF NOT EXISTS idx_transactions_created ON transactions FIELDS createdAt;
DEFINE INDEX IF NOT EXISTS idx_transactions_order ON transactions FIELDS orderId;

DEFINE TABLE IF NOT EXISTS loyalties SCHEMALESS;
"#;

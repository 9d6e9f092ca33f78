//! Repository Module
//!
//! One repository per table, all sharing the embedded SurrealDB handle.

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
pub use admin::AdminRepository;
pub use item::ItemRepository;
pub use loyalty::LoyaltyRepository;
pub use order::OrderRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;

use std::future::Future;
use std::time::Duration;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Optimistic transaction lost a read/write race; safe to run again
    #[error("Write conflict: {0}")]
    Conflict(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        if is_retryable_conflict(&msg) {
            RepoError::Conflict(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

/// SurrealDB reports a lost optimistic commit as
/// "... read or write conflict. This transaction can be retried"
fn is_retryable_conflict(msg: &str) -> bool {
    msg.contains("can be retried") || msg.contains("read or write conflict")
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: API 统一使用 "table:key" 格式，路径参数也接受纯 key
// =============================================================================

/// Resolve a path/body id into a record of `table`
///
/// `"orders:abc"`, `"orders:⟨a-b⟩"` and `"abc"` all address the `orders` table.
pub fn parse_record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    let id = id.trim();
    if id.is_empty() {
        return Err(RepoError::Validation("Empty ID".to_string()));
    }
    let prefix = format!("{}:", table);
    match id.strip_prefix(&prefix) {
        Some("") => Err(RepoError::Validation(format!("Invalid ID: {}", id))),
        Some(key) => Ok(id
            .parse::<RecordId>()
            .ok()
            .filter(|thing| thing.table() == table)
            .unwrap_or_else(|| RecordId::from_table_key(table, key))),
        None => Ok(RecordId::from_table_key(table, id)),
    }
}

// =============================================================================
// Write conflicts
// =============================================================================

/// Maximum attempts for a statement that keeps losing write races
pub const MAX_CONFLICT_ATTEMPTS: u32 = 10;
/// Base delay between attempts (exponential backoff, jittered)
const CONFLICT_BASE_DELAY_MS: u64 = 2;

/// Run `op` again while it fails with [`RepoError::Conflict`]
///
/// Each attempt must be a complete statement so a rerun sees the state left by
/// whoever won the race. Other errors are returned on the first occurrence.
pub async fn retry_on_conflict<T, F, Fut>(label: &str, mut op: F) -> RepoResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RepoResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(RepoError::Conflict(msg)) if attempt + 1 < MAX_CONFLICT_ATTEMPTS => {
                let cap = CONFLICT_BASE_DELAY_MS << attempt.min(6);
                let delay_ms = cap / 2 + rand::random::<u64>() % (cap / 2 + 1);
                tracing::debug!(
                    op = label,
                    attempt = attempt + 1,
                    delay_ms = delay_ms,
                    error = %msg,
                    "Write conflict, retrying"
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(RepoError::Conflict(msg)) => {
                tracing::warn!(op = label, attempts = attempt + 1, "Write conflict persisted, giving up");
                return Err(RepoError::Conflict(msg));
            }
            other => return other,
        }
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

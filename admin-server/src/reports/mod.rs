//! Sales reports
//!
//! Both reports cover completed transactions from the configured epoch
//! (midnight in the business timezone) up to now.

pub mod aggregate;
pub mod money;

pub use aggregate::{ReportBucket, ReportPeriod, TotalCollection, aggregate, total_amount};

use chrono::NaiveDate;
use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::Transaction;
use crate::db::repository::TransactionRepository;
use crate::utils::AppResult;
use crate::utils::time::{day_start_millis, now_millis};

#[derive(Clone)]
pub struct ReportService {
    transactions: TransactionRepository,
    epoch: NaiveDate,
    tz: Tz,
}

impl ReportService {
    pub fn new(db: Surreal<Db>, epoch: NaiveDate, tz: Tz) -> Self {
        Self {
            transactions: TransactionRepository::new(db),
            epoch,
            tz,
        }
    }

    /// `[epoch midnight, now)` in Unix millis
    pub fn window(&self) -> (i64, i64) {
        (day_start_millis(self.epoch, self.tz), now_millis())
    }

    async fn in_window(&self) -> AppResult<Vec<Transaction>> {
        let (start, end) = self.window();
        Ok(self.transactions.find_in_window(start, end).await?)
    }

    /// Completed sales grouped by day, week or month
    pub async fn accepted_orders(&self, period: ReportPeriod) -> AppResult<Vec<ReportBucket>> {
        let records = self.in_window().await?;
        let buckets = aggregate(&records, period, self.tz);
        tracing::debug!(period = %period, transactions = records.len(), buckets = buckets.len(), "Accepted orders report");
        Ok(buckets)
    }

    /// Total of completed sales
    ///
    /// The period is validated by the caller but does not narrow the window:
    /// the figure always covers epoch..now.
    pub async fn total_collection(&self, period: ReportPeriod) -> AppResult<TotalCollection> {
        let records = self.in_window().await?;
        tracing::debug!(period = %period, transactions = records.len(), "Total collection report");
        Ok(total_amount(&records))
    }
}

//! Date bucketing of completed transactions

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::{to_decimal, to_f64};
use crate::db::models::{Transaction, TransactionStatus};
use crate::utils::AppError;
use crate::utils::time::format_millis;

/// Reporting granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    /// strftime pattern of the bucket key
    ///
    /// Week is `%U`: weeks start on Sunday, days before the first Sunday of
    /// the year fall in week 00.
    pub fn bucket_format(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "%Y-%m-%d",
            ReportPeriod::Week => "%Y-%U",
            ReportPeriod::Month => "%Y-%m",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "day",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ReportPeriod::Day),
            "week" => Ok(ReportPeriod::Week),
            "month" => Ok(ReportPeriod::Month),
            _ => Err(AppError::validation("Invalid period")),
        }
    }
}

/// One bucket of the accepted-orders report
///
/// The key is serialized as `_id`, the name the dashboard charts read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBucket {
    #[serde(rename = "_id")]
    pub key: String,
    pub total_amount: f64,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCollection {
    pub total_amount: f64,
}

/// Group completed transactions into period buckets, ascending by key
///
/// Keys are computed in `tz`. Transactions that are not `Completed` are ignored.
pub fn aggregate(records: &[Transaction], period: ReportPeriod, tz: Tz) -> Vec<ReportBucket> {
    let mut buckets: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();

    for record in completed(records) {
        let Some(key) = format_millis(record.created_at, tz, period.bucket_format()) else {
            tracing::warn!(created_at = record.created_at, "Transaction timestamp out of range, skipped");
            continue;
        };
        let entry = buckets.entry(key).or_insert((Decimal::ZERO, 0));
        entry.0 += to_decimal(record.total_amount);
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(key, (total, count))| ReportBucket {
            key,
            total_amount: to_f64(total),
            order_count: count,
        })
        .collect()
}

/// Sum of all completed transactions
pub fn total_amount(records: &[Transaction]) -> TotalCollection {
    let total = completed(records).fold(Decimal::ZERO, |acc, r| acc + to_decimal(r.total_amount));
    TotalCollection {
        total_amount: to_f64(total),
    }
}

fn completed(records: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    records
        .iter()
        .filter(|r| r.status == TransactionStatus::Completed)
}

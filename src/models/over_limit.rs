//! Over-limit records
//!
//! One record per expense (or part of an expense) that pushed the day's
//! cumulative spend past the daily limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ExpenseId, OverLimitId};
use super::money::Money;

/// An immutable entry in the over-limit audit list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverLimitRecord {
    pub id: OverLimitId,

    /// When the overrun happened
    pub date: DateTime<Utc>,

    /// Portion of the expense above the daily limit
    pub amount: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<ExpenseId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_title: Option<String>,
}

impl OverLimitRecord {
    /// Create a record with a fresh id
    pub fn new(date: DateTime<Utc>, amount: Money, expense: Option<&ExpenseRef>) -> Self {
        Self {
            id: OverLimitId::new(),
            date,
            amount,
            expense_id: expense.map(|e| e.id),
            expense_title: expense.map(|e| e.title.clone()),
        }
    }
}

/// Identifies the expense behind a spend
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRef {
    pub id: ExpenseId,
    pub title: String,
}

impl ExpenseRef {
    pub fn new(id: ExpenseId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// Whether `history` already holds a record for `expense_id`
pub fn has_record_for(history: &[OverLimitRecord], expense_id: ExpenseId) -> bool {
    history.iter().any(|r| r.expense_id == Some(expense_id))
}

/// History ordered for presentation (newest first); storage order is untouched
pub fn newest_first(history: &[OverLimitRecord]) -> Vec<OverLimitRecord> {
    let mut sorted = history.to_vec();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

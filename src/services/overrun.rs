//! Incremental limit updates between reloads
//!
//! Adding an expense subtracts it from the remaining limit right away; the
//! next load recomputes the authoritative figures from the expense store.

use chrono::{DateTime, Utc};

use crate::models::over_limit::has_record_for;
use crate::models::{BudgetState, ExpenseRef, Money, OverLimitRecord};

/// Effect of a single spend on today's limit
#[derive(Debug, Clone, PartialEq)]
pub struct SpendOutcome {
    /// Remaining daily limit after the spend (negative when over)
    pub remaining: Money,

    /// Part of this spend that went past the limit
    pub overflow: Money,

    /// Record appended to the history, if any
    pub record: Option<OverLimitRecord>,
}

impl SpendOutcome {
    /// Whether the daily limit is now exceeded
    pub fn exceeded(&self) -> bool {
        self.remaining.is_negative()
    }

    /// Notice to show the user after the spend
    pub fn notice(&self) -> Option<SpendNotice> {
        if self.overflow.is_positive() {
            Some(SpendNotice::LimitExceeded {
                over_by: -self.remaining,
            })
        } else if self.remaining.is_positive() {
            Some(SpendNotice::Remaining(self.remaining))
        } else {
            None
        }
    }
}

/// Budget threshold notice raised by a spend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpendNotice {
    /// This spend pushed the day past its limit
    LimitExceeded { over_by: Money },
    /// Reminder of what is left for today
    Remaining(Money),
}

/// Subtract a spend from today's remaining limit
///
/// Only the part of `amount` above what was left is counted as overrun. A
/// record is appended when `expense` is given and that expense has no record
/// yet.
pub fn apply_spend(
    state: &mut BudgetState,
    amount: Money,
    expense: Option<&ExpenseRef>,
    now: DateTime<Utc>,
) -> SpendOutcome {
    let before = state.remaining_daily_limit;
    state.remaining_daily_limit = before - amount;

    let overflow = if amount > before {
        amount - before.floor_zero()
    } else {
        Money::zero()
    };

    let mut record = None;
    if overflow.is_positive() {
        state.over_limit_amount += overflow;

        if let Some(expense) = expense {
            if !has_record_for(&state.over_limit_history, expense.id) {
                let created = OverLimitRecord::new(now, overflow, Some(expense));
                state.over_limit_history.push(created.clone());
                record = Some(created);
            }
        }
    }

    SpendOutcome {
        remaining: state.remaining_daily_limit,
        overflow,
        record,
    }
}

/// Give a removed expense's amount back to today's remaining limit
///
/// History records are never removed.
pub fn release_spend(state: &mut BudgetState, amount: Money) {
    state.remaining_daily_limit += amount;
    state.over_limit_amount = (-state.remaining_daily_limit).floor_zero();
}

//! Budget configuration mutations
//!
//! Every change goes through [`apply_patch`]: merge the change into the
//! configuration, derive a fresh daily limit, restart today's tracking from
//! that limit, then subtract what has already been spent today.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{
    BudgetData, CriticalExpense, CriticalExpenseId, Expense, Money, OverLimitRecord,
};

use super::allowance::derive_daily_limit;
use super::rollover::reconcile_today;

/// A single configuration change
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetPatch {
    /// Set income and salary date; creates the budget on first use
    SetIncome {
        monthly_income: Money,
        salary_date: DateTime<Utc>,
    },
    AddCriticalExpense {
        title: String,
        amount: Money,
    },
    RemoveCriticalExpense {
        id: CriticalExpenseId,
    },
    SetSavingsGoal {
        amount: Money,
    },
    /// Replace every configuration field at once
    BulkUpdate {
        monthly_income: Money,
        salary_date: DateTime<Utc>,
        critical_expenses: Vec<CriticalExpense>,
        savings_goal: Money,
    },
}

impl BudgetPatch {
    /// Whether this patch may create a budget that does not exist yet
    pub fn creates_budget(&self) -> bool {
        matches!(self, Self::SetIncome { .. } | Self::BulkUpdate { .. })
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetIncome { .. } => "set_income",
            Self::AddCriticalExpense { .. } => "add_critical_expense",
            Self::RemoveCriticalExpense { .. } => "remove_critical_expense",
            Self::SetSavingsGoal { .. } => "set_savings_goal",
            Self::BulkUpdate { .. } => "bulk_update",
        }
    }
}

/// Result of applying a patch
#[derive(Debug, Clone, PartialEq)]
pub struct Patched {
    pub data: BudgetData,

    /// Critical expense added or removed by the patch
    pub critical_change: Option<CriticalChange>,

    /// Over-limit records appended while subtracting today's spend
    pub new_records: Vec<OverLimitRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CriticalChange {
    Added(CriticalExpense),
    Removed(CriticalExpense),
}

/// Apply a configuration change to the current budget (if any)
///
/// # Errors
///
/// Fails with a budget error when a patch other than `SetIncome`/`BulkUpdate`
/// targets an unconfigured budget, a validation error for negative amounts or
/// empty titles, and not-found when removing an unknown critical expense.
pub fn apply_patch<Tz: TimeZone>(
    current: Option<&BudgetData>,
    patch: BudgetPatch,
    expenses: &[Expense],
    now: &DateTime<Tz>,
) -> BudgetResult<Patched> {
    let now_utc = now.with_timezone(&Utc);
    let mut data = match current {
        Some(data) => data.clone(),
        None if patch.creates_budget() => BudgetData::initial(now_utc),
        None => return Err(BudgetError::not_configured()),
    };

    let mut critical_change = None;
    let config = &mut data.config;

    match patch {
        BudgetPatch::SetIncome {
            monthly_income,
            salary_date,
        } => {
            config.monthly_income = monthly_income;
            config.salary_date = salary_date;
        }
        BudgetPatch::AddCriticalExpense { title, amount } => {
            let expense = CriticalExpense::new(title.trim(), amount);
            config.critical_expenses.push(expense.clone());
            critical_change = Some(CriticalChange::Added(expense));
        }
        BudgetPatch::RemoveCriticalExpense { id } => {
            let index = config
                .critical_expenses
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| BudgetError::critical_expense_not_found(id.to_string()))?;
            critical_change = Some(CriticalChange::Removed(config.critical_expenses.remove(index)));
        }
        BudgetPatch::SetSavingsGoal { amount } => {
            config.savings_goal = amount;
        }
        BudgetPatch::BulkUpdate {
            monthly_income,
            salary_date,
            critical_expenses,
            savings_goal,
        } => {
            config.monthly_income = monthly_income;
            config.salary_date = salary_date;
            config.critical_expenses = critical_expenses;
            config.savings_goal = savings_goal;
        }
    }

    data.config
        .validate()
        .map_err(|e| BudgetError::Validation(e.to_string()))?;

    // A configuration change restarts today's tracking from the new limit
    let daily_limit = derive_daily_limit(&data.config, now);
    data.state.daily_limit = daily_limit;
    data.state.remaining_daily_limit = daily_limit;
    data.state.last_update_date = now_utc;

    let new_records = reconcile_today(&mut data.state, expenses, now);

    Ok(Patched {
        data,
        critical_change,
        new_records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewExpense;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    }

    fn salary_day_one() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn configured() -> BudgetData {
        apply_patch(
            None,
            BudgetPatch::SetIncome {
                monthly_income: Money::new(3000.0),
                salary_date: salary_day_one(),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data
    }

    #[test]
    fn test_set_income_creates_budget() {
        let data = configured();

        assert_eq!(data.config.monthly_income, Money::new(3000.0));
        assert_eq!(data.state.last_update_date, now());
        assert_eq!(data.state.remaining_daily_limit, data.state.daily_limit);
        assert!(data.state.daily_limit.is_positive());
    }

    #[test]
    fn test_other_patches_need_a_budget() {
        let err = apply_patch(
            None,
            BudgetPatch::SetSavingsGoal {
                amount: Money::new(100.0),
            },
            &[],
            &now(),
        )
        .unwrap_err();

        assert!(matches!(err, BudgetError::Budget(_)));
    }

    #[test]
    fn test_rent_and_savings_lower_the_limit() {
        let data = configured();
        let with_rent = apply_patch(
            Some(&data),
            BudgetPatch::AddCriticalExpense {
                title: "  Rent ".into(),
                amount: Money::new(1000.0),
            },
            &[],
            &now(),
        )
        .unwrap();

        assert!(matches!(
            &with_rent.critical_change,
            Some(CriticalChange::Added(e)) if e.title == "Rent"
        ));

        let with_savings = apply_patch(
            Some(&with_rent.data),
            BudgetPatch::SetSavingsGoal {
                amount: Money::new(500.0),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data;

        // Paid on the 1st, March has 31 days left
        assert_eq!(with_savings.state.daily_limit, Money::new(1500.0 / 31.0));
    }

    #[test]
    fn test_config_change_resets_partial_day_overrun() {
        let mut data = configured();
        data.state.remaining_daily_limit = Money::new(-40.0);
        data.state.over_limit_amount = Money::new(40.0);

        let patched = apply_patch(
            Some(&data),
            BudgetPatch::SetSavingsGoal {
                amount: Money::zero(),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data;

        assert_eq!(patched.state.remaining_daily_limit, patched.state.daily_limit);
        assert_eq!(patched.state.over_limit_amount, Money::zero());
    }

    #[test]
    fn test_todays_spend_is_subtracted() {
        let data = configured();
        let lunch = NewExpense::new("Lunch", Money::new(12.5), "Food")
            .into_expense(now().timestamp_millis() - 3_600_000);

        let patched = apply_patch(
            Some(&data),
            BudgetPatch::SetSavingsGoal {
                amount: Money::new(100.0),
            },
            &[lunch],
            &now(),
        )
        .unwrap()
        .data;

        assert_eq!(
            patched.state.remaining_daily_limit,
            patched.state.daily_limit - Money::new(12.5)
        );
    }

    #[test]
    fn test_remove_critical_expense() {
        let data = configured();
        let with_rent = apply_patch(
            Some(&data),
            BudgetPatch::AddCriticalExpense {
                title: "Rent".into(),
                amount: Money::new(1000.0),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data;
        let rent_id = with_rent.config.critical_expenses[0].id;

        let removed = apply_patch(
            Some(&with_rent),
            BudgetPatch::RemoveCriticalExpense { id: rent_id },
            &[],
            &now(),
        )
        .unwrap();
        assert!(removed.data.config.critical_expenses.is_empty());
        assert_eq!(removed.data.state.daily_limit, data.state.daily_limit);

        let err = apply_patch(
            Some(&removed.data),
            BudgetPatch::RemoveCriticalExpense { id: rent_id },
            &[],
            &now(),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let data = configured();

        let err = apply_patch(
            Some(&data),
            BudgetPatch::AddCriticalExpense {
                title: "Refund".into(),
                amount: Money::new(-5.0),
            },
            &[],
            &now(),
        )
        .unwrap_err();
        assert!(err.is_validation());

        let err = apply_patch(
            Some(&data),
            BudgetPatch::SetSavingsGoal {
                amount: Money::new(-1.0),
            },
            &[],
            &now(),
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_bulk_update_keeps_history() {
        let mut data = configured();
        data.state.saved_unused_funds = Money::new(42.0);
        data.state.over_limit_history.push(OverLimitRecord::new(
            now(),
            Money::new(5.0),
            None,
        ));

        let patched = apply_patch(
            Some(&data),
            BudgetPatch::BulkUpdate {
                monthly_income: Money::new(2000.0),
                salary_date: salary_day_one(),
                critical_expenses: vec![CriticalExpense::new("Internet", Money::new(30.0))],
                savings_goal: Money::new(200.0),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data;

        assert_eq!(patched.config.critical_expenses.len(), 1);
        assert_eq!(patched.state.daily_limit, Money::new(1770.0 / 31.0));
        assert_eq!(patched.state.saved_unused_funds, Money::new(42.0));
        assert_eq!(patched.state.over_limit_history.len(), 1);
    }

    #[test]
    fn test_non_finite_input_becomes_zero() {
        let patched = apply_patch(
            None,
            BudgetPatch::SetIncome {
                monthly_income: Money::new(f64::NAN),
                salary_date: salary_day_one(),
            },
            &[],
            &now(),
        )
        .unwrap()
        .data;

        assert_eq!(patched.state.daily_limit, Money::zero());
        assert!(patched.state.remaining_daily_limit.amount().is_finite());
    }
}

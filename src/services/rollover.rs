//! Day rollover, carry-over and reconciliation against recorded expenses
//!
//! Runs on every load. When a new calendar day has begun, yesterday's unused
//! allowance is spread over the rest of the cycle. Afterwards the remaining
//! limit, the outstanding overrun and the over-limit history are recomputed
//! from today's recorded expenses, which is the authoritative view.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::over_limit::has_record_for;
use crate::models::{BudgetData, BudgetState, Expense, Money, OverLimitRecord};

use super::allowance::allowance;

/// What happened when a new day began
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rollover {
    /// Yesterday's leftover allowance, never negative
    pub unused_funds: Money,

    /// Limit derived from the configuration alone
    pub base_limit: Money,

    /// Base limit plus today's share of the carry-over
    pub daily_limit: Money,

    /// Days the carry-over is spread across (today excluded), at least 1
    pub spread_days: i64,
}

/// Budget record after a load-time reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub data: BudgetData,
    pub rollover: Option<Rollover>,

    /// Over-limit records appended by this reconciliation
    pub new_records: Vec<OverLimitRecord>,
}

/// Bring a stored record up to date for `now`
///
/// Calling this twice on the same day with no new expenses yields the same
/// record both times.
pub fn reconcile_on_load<Tz: TimeZone>(
    data: &BudgetData,
    expenses: &[Expense],
    now: &DateTime<Tz>,
) -> Reconciled {
    let mut data = data.clone();
    let rollover = roll_over(&mut data, now);
    let new_records = reconcile_today(&mut data.state, expenses, now);

    Reconciled {
        data,
        rollover,
        new_records,
    }
}

/// Re-anchor the daily limit if `now` falls on a later day than the last update
pub fn roll_over<Tz: TimeZone>(data: &mut BudgetData, now: &DateTime<Tz>) -> Option<Rollover> {
    let tz = now.timezone();
    let last_day = data.state.last_update_date.with_timezone(&tz).date_naive();
    if last_day == now.date_naive() {
        return None;
    }

    let unused_funds = data.state.remaining_daily_limit.floor_zero();
    let fresh = allowance(&data.config, now);
    let spread_days = (fresh.days_until_next - 1).max(1);

    let daily_limit = if unused_funds.is_positive() {
        fresh.daily_limit + unused_funds / spread_days as f64
    } else {
        fresh.daily_limit
    };

    let state = &mut data.state;
    state.daily_limit = daily_limit;
    state.remaining_daily_limit = daily_limit;
    state.last_update_date = now.with_timezone(&Utc);
    state.saved_unused_funds += unused_funds;
    state.unused_funds_yesterday = unused_funds;

    Some(Rollover {
        unused_funds,
        base_limit: fresh.daily_limit,
        daily_limit,
        spread_days,
    })
}

/// Expenses whose local calendar day in `tz` is `day`
pub fn expenses_on_day<'e, Tz: TimeZone>(
    expenses: &'e [Expense],
    day: NaiveDate,
    tz: &Tz,
) -> Vec<&'e Expense> {
    expenses
        .iter()
        .filter(|e| e.local_date(tz) == Some(day))
        .collect()
}

/// Recompute today's remaining limit, overrun and history from recorded expenses
///
/// Returns the over-limit records that were appended.
pub fn reconcile_today<Tz: TimeZone>(
    state: &mut BudgetState,
    expenses: &[Expense],
    now: &DateTime<Tz>,
) -> Vec<OverLimitRecord> {
    let mut today = expenses_on_day(expenses, now.date_naive(), &now.timezone());
    today.sort_by_key(|e| e.timestamp);

    let spent: Money = today.iter().map(|e| e.amount).sum();
    state.remaining_daily_limit = state.daily_limit - spent;
    state.over_limit_amount = (spent - state.daily_limit).floor_zero();

    let limit = state.daily_limit;
    let mut running = Money::zero();
    let mut appended = Vec::new();

    for expense in today {
        let before = running;
        running += expense.amount;
        if running <= limit {
            continue;
        }

        // Only the part of this expense above the limit counts
        let overflow = running - before.max(limit);
        if !overflow.is_positive() || has_record_for(&state.over_limit_history, expense.id) {
            continue;
        }

        let date = expense
            .occurred_at()
            .unwrap_or_else(|| now.with_timezone(&Utc));
        let record = OverLimitRecord::new(date, overflow, Some(&expense.expense_ref()));
        state.over_limit_history.push(record.clone());
        appended.push(record);
    }

    appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetConfig, NewExpense};
    use crate::services::allowance::derive_daily_limit;
    use chrono::{FixedOffset, TimeDelta};

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
    }

    fn budget(last_update: DateTime<Utc>, limit: f64, remaining: f64) -> BudgetData {
        BudgetData {
            config: BudgetConfig {
                monthly_income: Money::new(3000.0),
                salary_date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
                critical_expenses: Vec::new(),
                savings_goal: Money::zero(),
            },
            state: BudgetState {
                daily_limit: Money::new(limit),
                remaining_daily_limit: Money::new(remaining),
                last_update_date: last_update,
                over_limit_amount: Money::new(-remaining).floor_zero(),
                over_limit_history: Vec::new(),
                saved_unused_funds: Money::zero(),
                unused_funds_yesterday: Money::zero(),
            },
        }
    }

    fn spend(title: &str, amount: f64, when: DateTime<Utc>) -> Expense {
        NewExpense::new(title, Money::new(amount), "Food").into_expense(when.timestamp_millis())
    }

    #[test]
    fn test_same_day_is_left_alone() {
        let data = budget(at(3, 10, 7), 100.0, 40.0);

        let mut rolled = data.clone();
        assert!(roll_over(&mut rolled, &at(3, 10, 22)).is_none());
        assert_eq!(rolled, data);
    }

    #[test]
    fn test_carry_over_spread_excludes_today() {
        // Salary on the 15th; on March 10th there are 5 days left
        let data = budget(at(3, 9, 20), 100.0, 20.0);
        let now = at(3, 10, 0);
        let base = derive_daily_limit(&data.config, &now);

        let mut rolled = data.clone();
        let rollover = roll_over(&mut rolled, &now).unwrap();

        assert_eq!(rollover.spread_days, 4);
        assert_eq!(rollover.base_limit, base);
        assert_eq!(rolled.state.daily_limit, base + Money::new(20.0) / 4.0);
        assert_eq!(rolled.state.remaining_daily_limit, rolled.state.daily_limit);
        assert_eq!(rolled.state.unused_funds_yesterday, Money::new(20.0));
        assert_eq!(rolled.state.saved_unused_funds, Money::new(20.0));
        assert_eq!(rolled.state.last_update_date, now);
    }

    #[test]
    fn test_overrun_yesterday_carries_nothing() {
        let data = budget(at(3, 9, 20), 100.0, -35.0);
        let now = at(3, 10, 0);

        let mut rolled = data.clone();
        let rollover = roll_over(&mut rolled, &now).unwrap();

        assert_eq!(rollover.unused_funds, Money::zero());
        assert_eq!(rolled.state.daily_limit, derive_daily_limit(&data.config, &now));
        assert_eq!(rolled.state.saved_unused_funds, Money::zero());
    }

    #[test]
    fn test_reconcile_twice_same_day_is_stable() {
        let data = budget(at(3, 9, 20), 100.0, 20.0);
        let now = at(3, 10, 9);
        let expenses = vec![
            spend("Breakfast", 30.0, at(3, 10, 8)),
            spend("Yesterday", 500.0, at(3, 9, 21)),
        ];

        let first = reconcile_on_load(&data, &expenses, &now);
        let second = reconcile_on_load(&first.data, &expenses, &now);

        assert!(first.rollover.is_some());
        assert!(second.rollover.is_none());
        assert_eq!(second.data, first.data);
        assert_eq!(first.data.state.saved_unused_funds, Money::new(20.0));
        assert_eq!(
            first.data.state.remaining_daily_limit,
            first.data.state.daily_limit - Money::new(30.0)
        );
    }

    #[test]
    fn test_overrun_sign_matches_remaining() {
        let now = at(3, 10, 18);
        let expenses = vec![
            spend("Groceries", 60.0, at(3, 10, 9)),
            spend("Dinner", 55.0, at(3, 10, 17)),
        ];

        let result = reconcile_on_load(&budget(at(3, 10, 6), 100.0, 100.0), &expenses, &now);
        let state = &result.data.state;

        assert_eq!(state.remaining_daily_limit, Money::new(-15.0));
        assert_eq!(state.over_limit_amount, Money::new(15.0));
        assert!(state.is_over_limit());

        let under = reconcile_on_load(&budget(at(3, 10, 6), 200.0, 200.0), &expenses, &now);
        assert!(!under.data.state.over_limit_amount.is_positive());
        assert!(!under.data.state.remaining_daily_limit.is_negative());
    }

    #[test]
    fn test_history_records_overflow_once_per_expense() {
        let now = at(3, 10, 20);
        let lunch = spend("Lunch", 70.0, at(3, 10, 12));
        let dinner = spend("Dinner", 50.0, at(3, 10, 19));
        let snack = spend("Snack", 10.0, at(3, 10, 20));
        // Stored out of order on purpose
        let expenses = vec![snack.clone(), dinner.clone(), lunch];

        let first = reconcile_on_load(&budget(at(3, 10, 6), 100.0, 100.0), &expenses, &now);
        let history = &first.data.state.over_limit_history;

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].expense_id, Some(dinner.id));
        assert_eq!(history[0].amount, Money::new(20.0));
        assert_eq!(history[0].date.timestamp_millis(), dinner.timestamp);
        assert_eq!(history[1].expense_id, Some(snack.id));
        assert_eq!(history[1].amount, Money::new(10.0));

        let again = reconcile_on_load(&first.data, &expenses, &now);
        assert!(again.new_records.is_empty());
        assert_eq!(again.data.state.over_limit_history.len(), 2);
    }

    #[test]
    fn test_today_bounds_follow_local_calendar() {
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        // 23:00 UTC on March 9th is 01:00 on March 10th in UTC+2
        let late = spend("Night bus", 5.0, at(3, 9, 23));
        let early = spend("Yesterday", 7.0, at(3, 9, 21));
        let now = at(3, 10, 10).with_timezone(&plus_two);

        let mut state = budget(at(3, 10, 6), 100.0, 100.0).state;
        reconcile_today(&mut state, &[late, early], &now);

        assert_eq!(state.remaining_daily_limit, Money::new(95.0));
    }

    #[test]
    fn test_expense_on_next_day_boundary_excluded() {
        let now = at(3, 10, 12);
        let midnight = spend("Tomorrow", 40.0, at(3, 11, 0));
        let just_before = spend("Late", 4.0, at(3, 11, 0) - TimeDelta::milliseconds(1));

        let mut state = budget(at(3, 10, 6), 100.0, 100.0).state;
        reconcile_today(&mut state, &[midnight, just_before], &now);

        assert_eq!(state.remaining_daily_limit, Money::new(96.0));
    }
}

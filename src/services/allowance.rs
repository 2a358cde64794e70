//! Daily limit derivation
//!
//! The income cycle runs from one salary date to the next. Discretionary
//! income (income minus critical expenses minus the savings goal) is spread
//! over the days left until the next salary.
//!
//! All calendar math happens on wall-clock time in the caller's timezone.
//! Moving a date into another month keeps its day-of-month and lets it
//! overflow into the following month when that month is shorter (day 31 in
//! April lands on May 1st).

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::models::{BudgetConfig, Money};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Used only when a cycle boundary cannot be represented as a date
const FALLBACK_CYCLE_DAYS: i64 = 30;

/// Result of a daily-limit derivation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allowance {
    /// Amount allocated to each remaining day of the cycle, never negative
    pub daily_limit: Money,

    /// Days until the next salary, counting today; at least 1
    pub days_until_next: i64,

    /// Discretionary amount still available for the rest of the cycle
    pub available: Money,
}

/// Derive today's daily limit from the configuration
pub fn derive_daily_limit<Tz: TimeZone>(config: &BudgetConfig, now: &DateTime<Tz>) -> Money {
    allowance(config, now).daily_limit
}

/// Derive the daily limit along with the cycle figures it was computed from
pub fn allowance<Tz: TimeZone>(config: &BudgetConfig, now: &DateTime<Tz>) -> Allowance {
    let discretionary = config.discretionary();
    let today = now.naive_local();
    let salary = config
        .salary_date
        .with_timezone(&now.timezone())
        .naive_local();

    let (available, days) = match cycle_position(salary, today) {
        Some(CyclePosition::AfterSalary { days_until_next }) => (discretionary, days_until_next),
        Some(CyclePosition::BeforeSalary {
            days_until_next,
            cycle_days,
        }) => {
            // Only the part of the month still ahead is available
            let share = days_until_next as f64 / cycle_days as f64;
            (discretionary * share, days_until_next)
        }
        None => (discretionary, FALLBACK_CYCLE_DAYS),
    };

    let days_until_next = days.max(1);
    let daily_limit = (available / days_until_next as f64).floor_zero();

    Allowance {
        daily_limit,
        days_until_next,
        available,
    }
}

enum CyclePosition {
    /// This month's salary has already arrived
    AfterSalary { days_until_next: i64 },
    /// Still in the tail of the previous cycle
    BeforeSalary { days_until_next: i64, cycle_days: i64 },
}

fn cycle_position(salary: NaiveDateTime, today: NaiveDateTime) -> Option<CyclePosition> {
    let anchor = salary_anchor(salary, today)?;

    if today >= anchor {
        let next = shift_months(anchor, 1)?;
        Some(CyclePosition::AfterSalary {
            days_until_next: ceil_days(next - today),
        })
    } else {
        let previous = shift_months(anchor, -1)?;
        Some(CyclePosition::BeforeSalary {
            days_until_next: ceil_days(anchor - today),
            cycle_days: ceil_days(anchor - previous),
        })
    }
}

/// The salary's day-of-month and time of day placed in today's month
pub fn salary_anchor(salary: NaiveDateTime, today: NaiveDateTime) -> Option<NaiveDateTime> {
    month_day(today.year(), today.month(), salary.day(), salary.time())
}

/// Move a wall-clock time by whole months, keeping its day-of-month
pub fn shift_months(at: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let index = at.year().checked_mul(12)? + at.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    month_day(year, month, at.day(), at.time())
}

/// `day` of the given month, overflowing into the next month when too large
fn month_day(year: i32, month: u32, day: u32, time: NaiveTime) -> Option<NaiveDateTime> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let date = first.checked_add_days(Days::new(u64::from(day.saturating_sub(1))))?;
    Some(date.and_time(time))
}

/// Whole days in a duration, rounded up (a partial day counts as a day)
pub fn ceil_days(duration: TimeDelta) -> i64 {
    let millis = duration.num_milliseconds();
    millis.div_euclid(MILLIS_PER_DAY) + i64::from(millis.rem_euclid(MILLIS_PER_DAY) != 0)
}

//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod expense;
pub mod report;

pub use budget::{handle_budget_command, handle_status, BudgetCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use report::{handle_report_command, ReportCommands};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::config::settings::Settings;
use crate::display::format_rollover;
use crate::error::{BudgetError, BudgetResult};
use crate::models::Money;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Parse a non-negative amount such as "12.50" or "12,50"
pub(crate) fn parse_amount(input: &str) -> BudgetResult<Money> {
    let amount = Money::parse(input).map_err(|e| {
        BudgetError::Validation(format!(
            "Invalid amount: '{}'. Use a format like '12.50'. Error: {}",
            input, e
        ))
    })?;

    if amount.is_negative() {
        return Err(BudgetError::Validation(format!(
            "Amount cannot be negative: '{}'",
            input
        )));
    }
    Ok(amount)
}

/// Parse a YYYY-MM-DD date
pub(crate) fn parse_date(input: &str) -> BudgetResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        BudgetError::Validation(format!("Invalid date format: '{}'. Use YYYY-MM-DD", input))
    })
}

/// Midnight of a local calendar day as a UTC instant
pub(crate) fn local_midnight(day: NaiveDate) -> BudgetResult<DateTime<Utc>> {
    Local
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| BudgetError::Validation(format!("No local midnight on {}", day)))
}

/// Salary date from either a full date or a day of the month (1-31)
///
/// A bare day is placed in January of the current year so that every day
/// number is valid.
pub(crate) fn parse_salary_date(input: &str, now: &DateTime<Local>) -> BudgetResult<DateTime<Utc>> {
    let day = match input.trim().parse::<u32>() {
        Ok(day) => NaiveDate::from_ymd_opt(now.year(), 1, day).ok_or_else(|| {
            BudgetError::Validation(format!("Salary day must be between 1 and 31, got {}", day))
        })?,
        Err(_) => parse_date(input)?,
    };
    local_midnight(day)
}

/// Inclusive epoch-millisecond bounds for an optional local date range
pub(crate) fn date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> BudgetResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let start = from.map(parse_date).transpose()?.map(local_midnight).transpose()?;
    let end = match to.map(parse_date).transpose()? {
        Some(day) => {
            let next = day
                .succ_opt()
                .ok_or_else(|| BudgetError::Validation(format!("Date out of range: {}", day)))?;
            Some(local_midnight(next)? - chrono::TimeDelta::milliseconds(1))
        }
        None => None,
    };

    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            return Err(BudgetError::Validation(
                "End date is before start date".into(),
            ));
        }
    }
    Ok((start, end))
}

/// Load the budget for `now`, announcing a day rollover if one happened
pub(crate) fn open_budget<'a>(
    storage: &'a Storage,
    settings: &Settings,
    now: &DateTime<Local>,
) -> BudgetResult<BudgetService<'a>> {
    let mut service = BudgetService::new(storage);
    service.load(now)?;

    if let Some(rollover) = service.last_rollover() {
        println!("{}", format_rollover(rollover, &settings.currency_symbol));
        println!();
    }
    Ok(service)
}

//! Budget display formatting
//!
//! Status panel, configuration summary, over-limit history and the notices
//! shown after a spend.

use chrono::TimeZone;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::report::{format_money_colored, truncate};
use crate::models::{BudgetConfig, BudgetData, OverLimitRecord};
use crate::services::{Allowance, Rollover, SpendNotice};

/// Format today's budget status
pub fn format_budget_status(data: &BudgetData, allowance: &Allowance, symbol: &str) -> String {
    let state = &data.state;
    let mut output = String::new();

    output.push_str(&format!(
        "Daily limit:      {}\n",
        state.daily_limit.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Spent today:      {}\n",
        state.spent_today().format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Remaining today:  {}\n",
        format_money_colored(state.remaining_daily_limit, symbol)
    ));
    output.push_str(&format!(
        "Days until salary: {}\n",
        allowance.days_until_next
    ));

    if state.over_limit_amount.is_positive() {
        output.push_str(&format!(
            "\n⚠ Over the daily limit by {}\n",
            state.over_limit_amount.format_with_symbol(symbol)
        ));
    }

    if state.unused_funds_yesterday.is_positive() {
        output.push_str(&format!(
            "\nCarried over from yesterday: {}\n",
            state.unused_funds_yesterday.format_with_symbol(symbol)
        ));
    }

    output
}

/// Format the budget configuration
pub fn format_budget_config(config: &BudgetConfig, date_format: &str, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Monthly income:  {}\n",
        config.monthly_income.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Salary date:     {} (day {} of each month)\n",
        config.salary_date.format(date_format),
        config.salary_date.format("%-d")
    ));
    output.push_str(&format!(
        "Savings goal:    {}\n",
        config.savings_goal.format_with_symbol(symbol)
    ));

    if config.critical_expenses.is_empty() {
        output.push_str("Critical expenses: none\n");
    } else {
        output.push_str("Critical expenses:\n");
        for expense in &config.critical_expenses {
            output.push_str(&format!(
                "  {:<14} {:<24} {:>14}\n",
                expense.id.to_string(),
                truncate(&expense.title, 24),
                expense.amount.format_with_symbol(symbol)
            ));
        }
    }

    output.push_str(&format!(
        "Discretionary:   {}\n",
        format_money_colored(config.discretionary(), symbol)
    ));

    output
}

#[derive(Tabled)]
struct OverLimitRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Expense")]
    expense: String,
    #[tabled(rename = "Over by")]
    amount: String,
}

/// Format the over-limit history in the order given
pub fn format_over_limit_history<Tz: TimeZone>(
    records: &[OverLimitRecord],
    tz: &Tz,
    date_format: &str,
    symbol: &str,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    if records.is_empty() {
        return "No over-limit records.\n".to_string();
    }

    let rows = records.iter().map(|record| OverLimitRow {
        date: record
            .date
            .with_timezone(tz)
            .format(&format!("{} %H:%M", date_format))
            .to_string(),
        expense: record
            .expense_title
            .as_deref()
            .map(|t| truncate(t, 28))
            .unwrap_or_else(|| "-".to_string()),
        amount: record.amount.format_with_symbol(symbol),
    });

    let mut output = Table::new(rows).with(Style::sharp()).to_string();
    output.push('\n');
    output
}

/// Message shown after an expense is recorded
pub fn format_spend_notice(notice: &SpendNotice, symbol: &str) -> String {
    match notice {
        SpendNotice::LimitExceeded { over_by } => format!(
            "⚠ Daily limit exceeded by {}",
            over_by.format_with_symbol(symbol)
        ),
        SpendNotice::Remaining(left) => {
            format!("Left for today: {}", left.format_with_symbol(symbol))
        }
    }
}

/// Message shown when a new day began since the last run
pub fn format_rollover(rollover: &Rollover, symbol: &str) -> String {
    if rollover.unused_funds.is_positive() {
        format!(
            "New day: {} unused yesterday, spread over {} day(s). Today's limit is {}",
            rollover.unused_funds.format_with_symbol(symbol),
            rollover.spread_days,
            rollover.daily_limit.format_with_symbol(symbol)
        )
    } else {
        format!(
            "New day: today's limit is {}",
            rollover.daily_limit.format_with_symbol(symbol)
        )
    }
}

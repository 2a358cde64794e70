//! Budget CLI commands
//!
//! Implements the commands that configure the daily budget (income, salary
//! date, critical expenses, savings goal) and show its state.

use chrono::{DateTime, Local};
use clap::Subcommand;

use super::{open_budget, parse_amount, parse_salary_date};
use crate::config::settings::Settings;
use crate::display::{
    format_budget_config, format_budget_status, format_over_limit_history,
};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{BudgetConfig, CriticalExpense, CriticalExpenseId};
use crate::services::BudgetPatch;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set monthly income and salary date (creates the budget)
    SetIncome {
        /// Monthly income (e.g., "3000" or "3000.00")
        amount: String,
        /// Salary day of the month (1-31) or a date (YYYY-MM-DD)
        #[arg(short, long)]
        salary: String,
    },

    /// Add a fixed monthly cost such as rent
    AddCritical {
        /// Title of the expense
        title: String,
        /// Monthly amount
        amount: String,
    },

    /// Remove a fixed monthly cost
    #[command(alias = "rm-critical")]
    RemoveCritical {
        /// Critical expense ID (as shown by `plan show`)
        id: String,
    },

    /// Set the amount put aside each month
    SetSavings {
        /// Monthly savings goal
        amount: String,
    },

    /// Show the budget configuration
    Show,

    /// Show days the daily limit was exceeded
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Erase the budget configuration and history
    Reset {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    now: DateTime<Local>,
    cmd: BudgetCommands,
) -> BudgetResult<()> {
    let symbol = settings.currency_symbol.as_str();
    let mut service = open_budget(storage, settings, &now)?;

    let patch = match cmd {
        BudgetCommands::SetIncome { amount, salary } => BudgetPatch::SetIncome {
            monthly_income: parse_amount(&amount)?,
            salary_date: parse_salary_date(&salary, &now)?,
        },
        BudgetCommands::AddCritical { title, amount } => BudgetPatch::AddCriticalExpense {
            title,
            amount: parse_amount(&amount)?,
        },
        BudgetCommands::RemoveCritical { id } => {
            let config = service.config().ok_or_else(BudgetError::not_configured)?;
            BudgetPatch::RemoveCriticalExpense {
                id: find_critical(config, &id)?.id,
            }
        }
        BudgetCommands::SetSavings { amount } => BudgetPatch::SetSavingsGoal {
            amount: parse_amount(&amount)?,
        },
        BudgetCommands::Show => {
            let config = service.config().ok_or_else(BudgetError::not_configured)?;
            print!("{}", format_budget_config(config, &settings.date_format, symbol));
            return Ok(());
        }
        BudgetCommands::History { limit } => {
            let mut records = service.over_limit_history_newest_first();
            records.truncate(limit);
            print!(
                "{}",
                format_over_limit_history(&records, &Local, &settings.date_format, symbol)
            );
            return Ok(());
        }
        BudgetCommands::Reset { yes } => {
            if !yes {
                return Err(BudgetError::Validation(
                    "Reset erases the budget and its history; pass --yes to confirm".into(),
                ));
            }
            service.reset(&now)?;
            println!("Budget reset.");
            return Ok(());
        }
    };

    let name = patch.name();
    let data = service.apply(patch, &now)?;
    tracing::debug!("applied {}", name);

    println!(
        "Daily limit: {}",
        data.state.daily_limit.format_with_symbol(symbol)
    );
    println!(
        "Remaining today: {}",
        data.state.remaining_daily_limit.format_with_symbol(symbol)
    );

    Ok(())
}

/// Show today's budget status
pub fn handle_status(storage: &Storage, settings: &Settings, now: DateTime<Local>) -> BudgetResult<()> {
    let service = open_budget(storage, settings, &now)?;

    match (service.data(), service.allowance(&now)) {
        (Some(data), Some(allowance)) => {
            print!(
                "{}",
                format_budget_status(data, &allowance, &settings.currency_symbol)
            );
        }
        _ => {
            println!("No budget configured yet.");
            println!("Run 'budget plan set-income <amount> --salary <day>' to get started.");
        }
    }

    Ok(())
}

/// Find a critical expense by full id or by the short id shown in listings
fn find_critical<'c>(config: &'c BudgetConfig, identifier: &str) -> BudgetResult<&'c CriticalExpense> {
    if let Ok(id) = identifier.parse::<CriticalExpenseId>() {
        return config
            .critical_expenses
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| BudgetError::critical_expense_not_found(identifier));
    }

    let prefix = identifier.trim();
    let prefix = prefix.strip_prefix("crit-").unwrap_or(prefix).to_lowercase();
    let mut matches = config
        .critical_expenses
        .iter()
        .filter(|e| !prefix.is_empty() && e.id.as_uuid().to_string().starts_with(&prefix));

    match (matches.next(), matches.next()) {
        (Some(expense), None) => Ok(expense),
        (None, _) => Err(BudgetError::critical_expense_not_found(identifier)),
        (Some(_), Some(_)) => Err(BudgetError::Validation(format!(
            "Critical expense id '{}' is ambiguous",
            identifier
        ))),
    }
}

//! Expense CLI commands
//!
//! Recording an expense also charges it against today's daily limit;
//! removing one of today's expenses gives its amount back.

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;

use super::{date_range, open_budget, parse_amount};
use crate::config::settings::Settings;
use crate::display::{format_expense_details, format_expense_table, format_spend_notice};
use crate::error::{BudgetError, BudgetResult};
use crate::models::{Expense, ExpenseFilter, NewExpense, SortOption};
use crate::services::ExpenseService;
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense now
    Add {
        /// What the money was spent on
        title: String,
        /// Amount (e.g., "12.50")
        amount: String,
        /// Category name
        #[arg(short, long, default_value = "Other")]
        category: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Icon shown next to the title
        #[arg(long)]
        icon: Option<String>,
    },

    /// List expenses
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(short = 'C', long)]
        category: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Minimum amount
        #[arg(long)]
        min: Option<String>,
        /// Maximum amount
        #[arg(long)]
        max: Option<String>,
        /// Sort order: newest, oldest, highest, lowest, category, category-desc
        #[arg(short, long, default_value = "newest")]
        sort: String,
        /// Number of expenses to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show expense details
    Show {
        /// Expense ID
        id: String,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New description (empty to clear)
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an expense
    #[command(alias = "rm")]
    Remove {
        /// Expense ID
        id: String,
    },

    /// List categories in use
    Categories,
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    now: DateTime<Local>,
    cmd: ExpenseCommands,
) -> BudgetResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        ExpenseCommands::Add {
            title,
            amount,
            category,
            description,
            icon,
        } => {
            let amount = parse_amount(&amount)?;
            // Load before adding so the new expense is charged exactly once
            let mut budget = open_budget(storage, settings, &now)?;

            let mut new = NewExpense::new(title, amount, category);
            if let Some(description) = description {
                new = new.with_description(description);
            }
            if let Some(icon) = icon {
                new = new.with_icon(icon);
            }

            let now_utc = now.with_timezone(&Utc);
            let expense = service.add(new, now_utc)?;
            println!(
                "Recorded: {} {} ({})",
                expense.title,
                expense.amount.format_with_symbol(symbol),
                expense.id
            );

            let outcome = budget.record_spend(expense.amount, Some(&expense.expense_ref()), &now)?;
            if let Some(notice) = outcome.as_ref().and_then(|o| o.notice()) {
                println!("{}", format_spend_notice(&notice, symbol));
            }
        }

        ExpenseCommands::List {
            category,
            from,
            to,
            min,
            max,
            sort,
            limit,
        } => {
            let (start, end) = date_range(from.as_deref(), to.as_deref())?;
            let filter = ExpenseFilter {
                start: start.map(|t| t.timestamp_millis()),
                end: end.map(|t| t.timestamp_millis()),
                category,
                min_amount: min.as_deref().map(parse_amount).transpose()?,
                max_amount: max.as_deref().map(parse_amount).transpose()?,
            };
            let sort = SortOption::parse(&sort).ok_or_else(|| {
                BudgetError::Validation(format!("Unknown sort order: '{}'", sort))
            })?;

            let mut expenses = service.list_filtered(&filter, sort)?;
            expenses.truncate(limit);
            print!("{}", format_expense_table(&expenses, &Local, date_format, symbol));
        }

        ExpenseCommands::Show { id } => {
            let expense = find(&service, &id)?;
            print!(
                "{}",
                format_expense_details(&expense, &Local, date_format, symbol)
            );
        }

        ExpenseCommands::Edit {
            id,
            title,
            amount,
            category,
            description,
        } => {
            let mut expense = find(&service, &id)?;
            if title.is_none() && amount.is_none() && category.is_none() && description.is_none() {
                println!("Nothing to change.");
                return Ok(());
            }

            if let Some(title) = title {
                expense.title = title.trim().to_string();
            }
            if let Some(amount) = amount {
                expense.amount = parse_amount(&amount)?;
            }
            if let Some(category) = category {
                expense.category = category.trim().to_string();
            }
            if let Some(description) = description {
                expense.description = Some(description).filter(|d| !d.trim().is_empty());
            }

            let updated = service.update(expense)?;
            println!("Updated: {} ({})", updated.title, updated.id);

            // Reload so today's figures are recomputed from the stored expenses
            open_budget(storage, settings, &now)?;
        }

        ExpenseCommands::Remove { id } => {
            let expense = find(&service, &id)?;
            let mut budget = open_budget(storage, settings, &now)?;

            let removed = service.remove(expense.id)?;
            println!(
                "Removed: {} {}",
                removed.title,
                removed.amount.format_with_symbol(symbol)
            );

            if removed.local_date(&Local) == Some(now.date_naive()) {
                budget.release_spend(removed.amount, &now)?;
            }
        }

        ExpenseCommands::Categories => {
            let categories = service.categories()?;
            if categories.is_empty() {
                println!("No categories yet.");
            }
            for category in categories {
                println!("{}", category);
            }
        }
    }

    Ok(())
}

fn find(service: &ExpenseService, identifier: &str) -> BudgetResult<Expense> {
    service
        .find(identifier)?
        .ok_or_else(|| BudgetError::expense_not_found(identifier))
}

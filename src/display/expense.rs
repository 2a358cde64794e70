//! Expense display formatting

use chrono::TimeZone;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::report::truncate;
use crate::models::{Expense, Money};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Local date and time of an expense, or a marker for unrepresentable timestamps
fn format_when<Tz: TimeZone>(expense: &Expense, tz: &Tz, date_format: &str) -> String {
    expense
        .local_time(tz)
        .map(|t| format!("{} {}", t.format(date_format), t.format("%H:%M")))
        .unwrap_or_else(|| "?".to_string())
}

fn title_with_icon(expense: &Expense) -> String {
    if expense.icon.is_empty() {
        expense.title.clone()
    } else {
        format!("{} {}", expense.icon, expense.title)
    }
}

/// Format a list of expenses as a table with a total line
pub fn format_expense_table<Tz: TimeZone>(
    expenses: &[Expense],
    tz: &Tz,
    date_format: &str,
    symbol: &str,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses.iter().map(|e| ExpenseRow {
        id: e.id.to_string(),
        date: format_when(e, tz, date_format),
        title: truncate(&title_with_icon(e), 28),
        category: truncate(&e.category, 16),
        amount: e.amount.format_with_symbol(symbol),
    });

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    let mut output = Table::new(rows).with(Style::sharp()).to_string();
    output.push('\n');
    output.push_str(&format!(
        "{} expense(s), total {}\n",
        expenses.len(),
        total.format_with_symbol(symbol)
    ));
    output
}

/// Format expense details for display
pub fn format_expense_details<Tz: TimeZone>(
    expense: &Expense,
    tz: &Tz,
    date_format: &str,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Title:       {}\n", title_with_icon(expense)));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Category:    {}\n", expense.category));
    output.push_str(&format!(
        "Recorded:    {}\n",
        format_when(expense, tz, date_format)
    ));

    if let Some(description) = &expense.description {
        output.push_str(&format!("Description: {}\n", description));
    }

    output
}

//! Category distribution
//!
//! Share of total spending per category, largest first.

use std::collections::HashMap;

use crate::display::report::{format_bar, format_percentage, separator, truncate};
use crate::models::{Expense, Money};

/// Spending in one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub total: Money,
    pub count: usize,
    /// Share of the grand total, 0-100
    pub percentage: f64,
}

/// Spending broken down by category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub rows: Vec<CategoryRow>,
    pub total: Money,
}

impl CategoryReport {
    pub fn generate(expenses: &[Expense]) -> Self {
        let mut order: Vec<&str> = Vec::new();
        let mut sums: HashMap<&str, (Money, usize)> = HashMap::new();

        for expense in expenses {
            let entry = sums.entry(expense.category.as_str()).or_insert_with(|| {
                order.push(expense.category.as_str());
                (Money::zero(), 0)
            });
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let total: Money = expenses.iter().map(|e| e.amount).sum();

        let mut rows: Vec<CategoryRow> = order
            .into_iter()
            .filter_map(|category| {
                let (sum, count) = sums.get(category)?;
                Some(CategoryRow {
                    category: category.to_string(),
                    total: *sum,
                    count: *count,
                    percentage: percentage_of(*sum, total),
                })
            })
            .collect();

        // Stable: ties keep first-use order
        rows.sort_by(|a, b| b.total.total_cmp(&a.total));

        Self { rows, total }
    }

    /// Largest category, if any money was spent
    pub fn top_category(&self) -> Option<&CategoryRow> {
        self.rows.first().filter(|row| row.total.is_positive())
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        if self.rows.is_empty() {
            return "No expenses recorded.\n".to_string();
        }

        let max = self.rows.first().map(|r| r.total.amount()).unwrap_or(0.0);
        let mut output = String::new();
        output.push_str(&format!(
            "{:<20} {:>14} {:>6} {:>7}\n",
            "Category", "Total", "Count", "Share"
        ));
        output.push_str(&separator(62));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>14} {:>6} {:>7} {}\n",
                truncate(&row.category, 20),
                row.total.format_with_symbol(symbol),
                row.count,
                format_percentage(row.percentage),
                format_bar(row.total.amount(), max, 10)
            ));
        }

        output.push_str(&separator(62));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>14}\n",
            "Total",
            self.total.format_with_symbol(symbol)
        ));
        output
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is not positive
pub fn percentage_of(part: Money, whole: Money) -> f64 {
    if whole.is_positive() {
        part.amount() / whole.amount() * 100.0
    } else {
        0.0
    }
}

//! Period totals and the per-month chart

use chrono::{DateTime, Datelike, TimeZone};

use crate::display::report::{format_bar, separator};
use crate::models::{Expense, Money};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Spending in the current month and year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodTotals {
    pub month: Money,
    pub year: Money,
}

impl PeriodTotals {
    /// Totals for the local month and year containing `now`
    pub fn generate<Tz: TimeZone>(expenses: &[Expense], now: &DateTime<Tz>) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();
        let mut totals = Self {
            month: Money::zero(),
            year: Money::zero(),
        };

        for expense in expenses {
            let Some(date) = expense.local_date(&tz) else {
                continue;
            };
            if date.year() != today.year() {
                continue;
            }
            totals.year += expense.amount;
            if date.month() == today.month() {
                totals.month += expense.amount;
            }
        }

        totals
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        format!(
            "This month: {}\nThis year:  {}\n",
            self.month.format_with_symbol(symbol),
            self.year.format_with_symbol(symbol)
        )
    }
}

/// Spending per calendar month of one year
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub year: i32,
    /// January first
    pub months: [Money; 12],
}

impl MonthlyReport {
    pub fn generate<Tz: TimeZone>(expenses: &[Expense], year: i32, tz: &Tz) -> Self {
        let mut months = [Money::zero(); 12];
        for expense in expenses {
            if let Some(date) = expense.local_date(tz).filter(|d| d.year() == year) {
                months[date.month0() as usize] += expense.amount;
            }
        }
        Self { year, months }
    }

    pub fn total(&self) -> Money {
        self.months.iter().sum()
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let max = self
            .months
            .iter()
            .map(|m| m.amount())
            .fold(0.0, f64::max);

        let mut output = format!("Spending in {}\n", self.year);
        output.push_str(&separator(44));
        output.push('\n');
        for (name, amount) in MONTH_NAMES.iter().zip(self.months.iter()) {
            output.push_str(&format!(
                "{:<4} {:>14} {}\n",
                name,
                amount.format_with_symbol(symbol),
                format_bar(amount.amount(), max, 20)
            ));
        }
        output.push_str(&separator(44));
        output.push('\n');
        output.push_str(&format!(
            "{:<4} {:>14}\n",
            "All",
            self.total().format_with_symbol(symbol)
        ));
        output
    }
}

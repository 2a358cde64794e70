//! Key metrics, unused funds and over-limit summaries

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::display::report::{format_percentage, separator};
use crate::models::{BudgetData, Expense, Money, OverLimitRecord};
use crate::services::allowance::ceil_days;

use super::category::{percentage_of, CategoryReport};

/// Days assumed when no explicit period is given
const DEFAULT_PERIOD_DAYS: i64 = 30;

/// Days shown in the over-limit summary
const RECENT_OVERRUN_DAYS: usize = 7;

/// Headline numbers for a period of expenses
#[derive(Debug, Clone, PartialEq)]
pub struct KeyMetrics {
    pub total: Money,
    pub average_per_day: Money,
    pub top_category: Option<String>,
    /// Change against the previous period's total in percent; 0 without one
    pub change_percent: f64,
}

impl KeyMetrics {
    /// `period` is the inclusive time range the expenses were selected from
    pub fn generate(
        expenses: &[Expense],
        previous: &[Expense],
        period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Self {
        let total: Money = expenses.iter().map(|e| e.amount).sum();
        let previous_total: Money = previous.iter().map(|e| e.amount).sum();

        let days = period
            .map(|(start, end)| ceil_days((end - start).abs()).max(1))
            .unwrap_or(DEFAULT_PERIOD_DAYS);

        let change_percent = if previous_total.is_zero() {
            0.0
        } else {
            (total - previous_total).amount() / previous_total.amount() * 100.0
        };

        Self {
            total,
            average_per_day: total / days as f64,
            top_category: CategoryReport::generate(expenses)
                .top_category()
                .map(|row| row.category.clone()),
            change_percent,
        }
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let change = if self.change_percent > 0.0 {
            format!("+{}", format_percentage(self.change_percent))
        } else {
            format_percentage(self.change_percent)
        };

        let mut output = String::from("Key Metrics\n");
        output.push_str(&separator(40));
        output.push('\n');
        output.push_str(&format!(
            "Total spent:        {}\n",
            self.total.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Average per day:    {}\n",
            self.average_per_day.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Top category:       {}\n",
            self.top_category.as_deref().unwrap_or("-")
        ));
        output.push_str(&format!("vs previous period: {}\n", change));
        output
    }
}

/// Carry-over statistics from the budget record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnusedFundsStats {
    /// Lifetime total of carried-over allowance
    pub saved: Money,
    /// `saved` as a share of monthly income, in percent
    pub share_of_income: f64,
    pub yesterday: Money,
}

impl UnusedFundsStats {
    pub fn from_budget(data: &BudgetData) -> Self {
        Self {
            saved: data.state.saved_unused_funds,
            share_of_income: percentage_of(
                data.state.saved_unused_funds,
                data.config.monthly_income,
            ),
            yesterday: data.state.unused_funds_yesterday,
        }
    }

    pub fn has_savings(&self) -> bool {
        self.saved.is_positive()
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        if !self.has_savings() {
            return "No unused funds carried over yet.\n".to_string();
        }
        format!(
            "Saved from unused allowance: {} ({} of monthly income)\nCarried over yesterday:      {}\n",
            self.saved.format_with_symbol(symbol),
            format_percentage(self.share_of_income),
            self.yesterday.format_with_symbol(symbol)
        )
    }
}

/// Overruns on one local day
#[derive(Debug, Clone, PartialEq)]
pub struct OverrunDay {
    pub date: NaiveDate,
    pub total: Money,
    pub count: usize,
}

/// Totals over the over-limit history
#[derive(Debug, Clone, PartialEq)]
pub struct OverLimitSummary {
    pub count: usize,
    pub total: Money,
    /// Most recent days with overruns, oldest first
    pub recent_days: Vec<OverrunDay>,
}

impl OverLimitSummary {
    pub fn generate<Tz: TimeZone>(history: &[OverLimitRecord], tz: &Tz) -> Self {
        let mut days: Vec<OverrunDay> = Vec::new();
        for record in history {
            let date = record.date.with_timezone(tz).date_naive();
            match days.iter_mut().find(|d| d.date == date) {
                Some(day) => {
                    day.total += record.amount;
                    day.count += 1;
                }
                None => days.push(OverrunDay {
                    date,
                    total: record.amount,
                    count: 1,
                }),
            }
        }
        days.sort_by_key(|d| d.date);
        let recent_days = days.split_off(days.len().saturating_sub(RECENT_OVERRUN_DAYS));

        Self {
            count: history.len(),
            total: history.iter().map(|r| r.amount).sum(),
            recent_days,
        }
    }

    pub fn format_terminal(&self, symbol: &str, date_format: &str) -> String {
        if self.count == 0 {
            return "Never over the daily limit.\n".to_string();
        }

        let mut output = format!(
            "Over the limit {} time(s), {} in total\n",
            self.count,
            self.total.format_with_symbol(symbol)
        );
        for day in &self.recent_days {
            output.push_str(&format!(
                "  {:<12} {:>14} ({})\n",
                day.date.format(date_format).to_string(),
                day.total.format_with_symbol(symbol),
                day.count
            ));
        }
        output
    }
}

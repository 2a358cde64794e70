//! Expense model
//!
//! A discrete spend logged by the user, plus the filter and sort options used
//! when listing expenses.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ExpenseId;
use super::money::Money;
use super::over_limit::ExpenseRef;

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    NegativeAmount,
    EmptyTitle,
    EmptyCategory,
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeAmount => write!(f, "Expense amount cannot be negative"),
            Self::EmptyTitle => write!(f, "Expense title cannot be empty"),
            Self::EmptyCategory => write!(f, "Expense category cannot be empty"),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Money,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Epoch milliseconds
    pub timestamp: i64,
    pub title: String,
    #[serde(default)]
    pub icon: String,
}

impl Expense {
    /// When the expense was recorded, if the timestamp is representable
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Wall-clock time of the expense in the given timezone
    pub fn local_time<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDateTime> {
        self.occurred_at()
            .map(|at| at.with_timezone(tz).naive_local())
    }

    /// Calendar day of the expense in the given timezone
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.local_time(tz).map(|t| t.date())
    }

    /// Reference used when the expense causes an over-limit record
    pub fn expense_ref(&self) -> ExpenseRef {
        ExpenseRef::new(self.id, self.title.clone())
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.amount.is_negative() {
            return Err(ExpenseValidationError::NegativeAmount);
        }
        if self.title.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyTitle);
        }
        if self.category.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyCategory);
        }
        Ok(())
    }
}

/// User input for a new expense; id and timestamp are assigned on save
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: Money,
    pub category: String,
    pub description: Option<String>,
    pub title: String,
    pub icon: String,
}

impl NewExpense {
    pub fn new(title: impl Into<String>, amount: Money, category: impl Into<String>) -> Self {
        Self {
            amount,
            category: category.into(),
            description: None,
            title: title.into(),
            icon: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Materialize the expense with a fresh id at the given instant
    pub fn into_expense(self, timestamp: i64) -> Expense {
        Expense {
            id: ExpenseId::new(),
            amount: self.amount,
            category: self.category,
            description: self.description.filter(|d| !d.trim().is_empty()),
            timestamp,
            title: self.title,
            icon: self.icon,
        }
    }
}

/// Criteria for narrowing an expense list; every bound is inclusive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Epoch millis lower bound
    pub start: Option<i64>,
    /// Epoch millis upper bound
    pub end: Option<i64>,
    pub category: Option<String>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
}

impl ExpenseFilter {
    /// Check whether an expense satisfies every set criterion
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.start.is_some_and(|start| expense.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| expense.timestamp > end) {
            return false;
        }
        if let Some(category) = &self.category {
            if &expense.category != category {
                return false;
            }
        }
        if self.min_amount.is_some_and(|min| expense.amount < min) {
            return false;
        }
        if self.max_amount.is_some_and(|max| expense.amount > max) {
            return false;
        }
        true
    }

    /// Keep the expenses matching this filter, preserving order
    pub fn apply(&self, expenses: &[Expense]) -> Vec<Expense> {
        expenses.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

/// Ordering for expense lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    NewestFirst,
    OldestFirst,
    HighestAmount,
    LowestAmount,
    CategoryAsc,
    CategoryDesc,
}

impl SortOption {
    /// Parse the short names used on the command line
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date-desc" | "newest" => Some(Self::NewestFirst),
            "date-asc" | "oldest" => Some(Self::OldestFirst),
            "amount-desc" | "highest" => Some(Self::HighestAmount),
            "amount-asc" | "lowest" => Some(Self::LowestAmount),
            "category-asc" | "category" => Some(Self::CategoryAsc),
            "category-desc" => Some(Self::CategoryDesc),
            _ => None,
        }
    }

    /// Sort expenses in place (stable)
    pub fn sort(&self, expenses: &mut [Expense]) {
        match self {
            Self::NewestFirst => expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            Self::OldestFirst => expenses.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            Self::HighestAmount => expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
            Self::LowestAmount => expenses.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
            Self::CategoryAsc => expenses.sort_by(|a, b| a.category.cmp(&b.category)),
            Self::CategoryDesc => expenses.sort_by(|a, b| b.category.cmp(&a.category)),
        }
    }
}

//! Budget configuration and tracked state
//!
//! `BudgetData` is the single record persisted per installation. It is the
//! user-entered `BudgetConfig` and the derived/tracked `BudgetState` written
//! side by side as one flat camelCase JSON object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CriticalExpenseId;
use super::money::Money;
use super::over_limit::OverLimitRecord;

/// Validation errors for budget input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeIncome,
    NegativeSavingsGoal,
    NegativeCriticalExpense(String),
    EmptyTitle,
}

impl std::fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeIncome => write!(f, "Monthly income cannot be negative"),
            Self::NegativeSavingsGoal => write!(f, "Savings goal cannot be negative"),
            Self::NegativeCriticalExpense(title) => {
                write!(f, "Critical expense '{}' cannot be negative", title)
            }
            Self::EmptyTitle => write!(f, "Critical expense title cannot be empty"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

/// A fixed recurring cost subtracted before deriving the discretionary budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalExpense {
    pub id: CriticalExpenseId,
    pub title: String,
    pub amount: Money,
}

impl CriticalExpense {
    /// Create a new critical expense with a fresh id
    pub fn new(title: impl Into<String>, amount: Money) -> Self {
        Self {
            id: CriticalExpenseId::new(),
            title: title.into(),
            amount,
        }
    }

    /// Validate the critical expense
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.title.trim().is_empty() {
            return Err(BudgetValidationError::EmptyTitle);
        }
        if self.amount.is_negative() {
            return Err(BudgetValidationError::NegativeCriticalExpense(
                self.title.clone(),
            ));
        }
        Ok(())
    }
}

/// User-entered budget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    pub monthly_income: Money,

    /// Only the day-of-month (and time of day) is meaningful; year and month
    /// are replaced by the current cycle at computation time.
    pub salary_date: DateTime<Utc>,

    #[serde(default)]
    pub critical_expenses: Vec<CriticalExpense>,

    #[serde(default)]
    pub savings_goal: Money,
}

impl BudgetConfig {
    /// Sum of all critical expenses
    pub fn fixed_costs(&self) -> Money {
        self.critical_expenses.iter().map(|e| e.amount).sum()
    }

    /// Income minus fixed costs minus the savings goal (may be negative)
    pub fn discretionary(&self) -> Money {
        self.monthly_income - self.fixed_costs() - self.savings_goal
    }

    /// Validate all user-entered amounts
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.monthly_income.is_negative() {
            return Err(BudgetValidationError::NegativeIncome);
        }
        if self.savings_goal.is_negative() {
            return Err(BudgetValidationError::NegativeSavingsGoal);
        }
        for expense in &self.critical_expenses {
            expense.validate()?;
        }
        Ok(())
    }
}

/// Derived and tracked daily-limit state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    /// Discretionary amount allocated for the current calendar day
    pub daily_limit: Money,

    /// `daily_limit` minus today's spend; negative while over the limit
    pub remaining_daily_limit: Money,

    /// When the limit was last (re)anchored; used to detect day rollover
    pub last_update_date: DateTime<Utc>,

    #[serde(default)]
    pub over_limit_amount: Money,

    /// Append-only, at most one record per expense
    #[serde(default)]
    pub over_limit_history: Vec<OverLimitRecord>,

    /// Lifetime total of carried-over unused allowance
    #[serde(default)]
    pub saved_unused_funds: Money,

    /// Carry-over applied at the most recent rollover
    #[serde(default)]
    pub unused_funds_yesterday: Money,
}

impl BudgetState {
    /// Whether today's spend has gone past the daily limit
    pub fn is_over_limit(&self) -> bool {
        self.remaining_daily_limit.is_negative()
    }

    /// Amount spent today according to the tracked fields
    pub fn spent_today(&self) -> Money {
        self.daily_limit - self.remaining_daily_limit
    }
}

/// The persisted budget record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetData {
    #[serde(flatten)]
    pub config: BudgetConfig,

    #[serde(flatten)]
    pub state: BudgetState,
}

impl BudgetData {
    /// The zero-value record used on first setup and after a wipe
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            config: BudgetConfig {
                monthly_income: Money::zero(),
                salary_date: now,
                critical_expenses: Vec::new(),
                savings_goal: Money::zero(),
            },
            state: BudgetState {
                daily_limit: Money::zero(),
                remaining_daily_limit: Money::zero(),
                last_update_date: now,
                over_limit_amount: Money::zero(),
                over_limit_history: Vec::new(),
                saved_unused_funds: Money::zero(),
                unused_funds_yesterday: Money::zero(),
            },
        }
    }
}

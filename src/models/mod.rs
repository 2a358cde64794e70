//! Core data models for daily-budget
//!
//! This module contains the data structures of the domain: the budget
//! configuration and its tracked daily-limit state, expenses, and over-limit
//! records.

pub mod budget;
pub mod expense;
pub mod ids;
pub mod money;
pub mod over_limit;

pub use budget::{BudgetConfig, BudgetData, BudgetState, BudgetValidationError, CriticalExpense};
pub use expense::{Expense, ExpenseFilter, ExpenseValidationError, NewExpense, SortOption};
pub use ids::{CriticalExpenseId, ExpenseId, OverLimitId};
pub use money::Money;
pub use over_limit::{ExpenseRef, OverLimitRecord};

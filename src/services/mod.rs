//! Service layer for daily-budget
//!
//! The budget engine is split into pure steps (limit derivation, rollover,
//! incremental spend tracking, configuration patches) that take the current
//! time as a parameter, and [`BudgetService`], which runs them against the
//! persistence ports.

pub mod allowance;
pub mod budget;
pub mod expense;
pub mod overrun;
pub mod patch;
pub mod rollover;

pub use allowance::{allowance, derive_daily_limit, Allowance};
pub use budget::BudgetService;
pub use expense::ExpenseService;
pub use overrun::{SpendNotice, SpendOutcome};
pub use patch::{apply_patch, BudgetPatch};
pub use rollover::{reconcile_on_load, Reconciled, Rollover};

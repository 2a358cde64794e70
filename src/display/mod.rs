//! Display formatting for terminal output
//!
//! Turns models and reports into the text printed by the CLI.

pub mod budget;
pub mod expense;
pub mod report;

pub use budget::{
    format_budget_config, format_budget_status, format_over_limit_history, format_rollover,
    format_spend_notice,
};
pub use expense::{format_expense_details, format_expense_table};

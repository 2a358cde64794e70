//! daily-budget - Personal expense tracker with a rolling daily spending limit
//!
//! The user enters a monthly income, the day the salary arrives, fixed
//! monthly costs and a savings goal. What is left is spread evenly over the
//! days until the next salary. Every recorded expense is charged against
//! today's limit; unspent allowance carries over to the remaining days of the
//! cycle, and every overrun is kept in an append-only history.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (budget record, expenses, over-limit records)
//! - `storage`: JSON file storage layer and the persistence ports
//! - `services`: The budget engine and expense management
//! - `reports`: Spending analytics
//! - `audit`: Audit logging system
//! - `display`, `cli`: Terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use daily_budget::config::BudgetPaths;
//! use daily_budget::services::BudgetService;
//! use daily_budget::storage::Storage;
//!
//! let storage = Storage::new(BudgetPaths::new()?)?;
//! storage.load_all()?;
//!
//! let mut budget = BudgetService::new(&storage);
//! budget.load(&chrono::Local::now())?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{BudgetError, BudgetResult};

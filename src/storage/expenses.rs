//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json. Expenses keep their
//! insertion order on disk.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{BudgetError, BudgetResult};
use crate::models::{Expense, ExpenseId};

use super::file_io::{read_json, write_json_atomic};
use super::ExpenseSource;

/// Serializable expense file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<Vec<Expense>>,
}

impl ExpenseRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> BudgetResult<RwLockReadGuard<'_, Vec<Expense>>> {
        self.data
            .read()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> BudgetResult<RwLockWriteGuard<'_, Vec<Expense>>> {
        self.data
            .write()
            .map_err(|e| BudgetError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load expenses from disk, replacing what is in memory
    pub fn load(&self) -> BudgetResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;
        *self.write()? = file_data.expenses;
        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> BudgetResult<()> {
        let file_data = ExpenseData {
            expenses: self.read()?.clone(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: ExpenseId) -> BudgetResult<Option<Expense>> {
        Ok(self.read()?.iter().find(|e| e.id == id).cloned())
    }

    /// All expenses in insertion order
    pub fn get_all(&self) -> BudgetResult<Vec<Expense>> {
        Ok(self.read()?.clone())
    }

    /// Append a new expense
    pub fn add(&self, expense: Expense) -> BudgetResult<()> {
        self.write()?.push(expense);
        Ok(())
    }

    /// Replace the expense with the same id, keeping its position
    pub fn update(&self, expense: Expense) -> BudgetResult<()> {
        let mut data = self.write()?;
        let slot = data
            .iter_mut()
            .find(|e| e.id == expense.id)
            .ok_or_else(|| BudgetError::expense_not_found(expense.id.to_string()))?;
        *slot = expense;
        Ok(())
    }

    /// Remove an expense, returning it if it existed
    pub fn remove(&self, id: ExpenseId) -> BudgetResult<Option<Expense>> {
        let mut data = self.write()?;
        Ok(data
            .iter()
            .position(|e| e.id == id)
            .map(|index| data.remove(index)))
    }
}

impl ExpenseSource for ExpenseRepository {
    fn list(&self) -> BudgetResult<Vec<Expense>> {
        self.get_all()
    }
}

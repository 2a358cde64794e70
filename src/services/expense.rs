//! Expense service
//!
//! CRUD over the expense store with validation and audit logging, plus the
//! day and filter queries used by the budget and the reports.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::audit::EntityType;
use crate::error::{BudgetError, BudgetResult};
use crate::models::{Expense, ExpenseFilter, ExpenseId, Money, NewExpense, SortOption};
use crate::storage::Storage;

use super::rollover::expenses_on_day;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new expense at `now`
    pub fn add(&self, new: NewExpense, now: DateTime<Utc>) -> BudgetResult<Expense> {
        let mut expense = new.into_expense(now.timestamp_millis());
        expense.title = expense.title.trim().to_string();
        expense.category = expense.category.trim().to_string();

        expense
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        self.storage.expenses.add(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_create(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )?;

        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> BudgetResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by full id or by the short id shown in listings
    pub fn find(&self, identifier: &str) -> BudgetResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.get(id);
        }

        let prefix = identifier.trim();
        let prefix = prefix.strip_prefix("exp-").unwrap_or(prefix).to_lowercase();
        if prefix.is_empty() {
            return Ok(None);
        }

        let mut matches = self
            .storage
            .expenses
            .get_all()?
            .into_iter()
            .filter(|e| e.id.as_uuid().to_string().starts_with(&prefix));

        match (matches.next(), matches.next()) {
            (Some(expense), None) => Ok(Some(expense)),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(BudgetError::Validation(format!(
                "Expense id '{}' is ambiguous",
                identifier
            ))),
        }
    }

    /// Replace an existing expense
    pub fn update(&self, expense: Expense) -> BudgetResult<Expense> {
        expense
            .validate()
            .map_err(|e| BudgetError::Validation(e.to_string()))?;

        let before = self
            .get(expense.id)?
            .ok_or_else(|| BudgetError::expense_not_found(expense.id.to_string()))?;

        self.storage.expenses.update(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &before,
            &expense,
        )?;

        Ok(expense)
    }

    /// Delete an expense, returning what was removed
    pub fn remove(&self, id: ExpenseId) -> BudgetResult<Expense> {
        let expense = self
            .storage
            .expenses
            .remove(id)?
            .ok_or_else(|| BudgetError::expense_not_found(id.to_string()))?;
        self.storage.expenses.save()?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(expense.title.clone()),
            &expense,
        )?;

        Ok(expense)
    }

    /// All expenses in the order they were recorded
    pub fn list(&self) -> BudgetResult<Vec<Expense>> {
        self.storage.expenses.get_all()
    }

    /// Expenses matching `filter`, ordered by `sort`
    pub fn list_filtered(&self, filter: &ExpenseFilter, sort: SortOption) -> BudgetResult<Vec<Expense>> {
        let mut expenses = filter.apply(&self.list()?);
        sort.sort(&mut expenses);
        Ok(expenses)
    }

    /// Expenses recorded on a local calendar day
    pub fn expenses_on<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> BudgetResult<Vec<Expense>> {
        let all = self.list()?;
        Ok(expenses_on_day(&all, day, tz).into_iter().cloned().collect())
    }

    /// Distinct categories in first-use order
    pub fn categories(&self) -> BudgetResult<Vec<String>> {
        let mut categories: Vec<String> = Vec::new();
        for expense in self.list()? {
            if !categories.contains(&expense.category) {
                categories.push(expense.category);
            }
        }
        Ok(categories)
    }
}

/// Sum of expense amounts
pub fn total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|e| e.amount).sum()
}

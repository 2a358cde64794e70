//! File-backed budget record
//!
//! The whole budget (configuration plus tracked state) lives in one flat JSON
//! object in `budget.json` and is overwritten wholesale on every save.

use std::path::PathBuf;

use crate::error::BudgetResult;
use crate::models::BudgetData;

use super::file_io::{read_json_opt, write_json_atomic};
use super::BudgetStore;

/// Repository for the single budget record
pub struct BudgetRepository {
    path: PathBuf,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Whether a budget record has ever been written
    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl BudgetStore for BudgetRepository {
    fn load(&self) -> BudgetResult<Option<BudgetData>> {
        read_json_opt(&self.path)
    }

    fn save(&self, data: &BudgetData) -> BudgetResult<()> {
        write_json_atomic(&self.path, data)
    }
}

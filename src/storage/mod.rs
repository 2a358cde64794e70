//! Storage layer for daily-budget
//!
//! JSON file storage with atomic writes. The budget engine talks to storage
//! only through the [`BudgetStore`] and [`ExpenseSource`] ports, so tests can
//! swap in in-memory or failing implementations.

pub mod budget;
pub mod expenses;
pub mod file_io;

pub use budget::BudgetRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, read_json_opt, write_json_atomic};

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::{BudgetPaths, Settings};
use crate::error::BudgetResult;
use crate::models::{BudgetData, Expense};

/// Whole-record persistence of the single budget record
pub trait BudgetStore {
    /// The stored record, or `None` before the first income entry
    fn load(&self) -> BudgetResult<Option<BudgetData>>;

    /// Overwrite the stored record
    fn save(&self, data: &BudgetData) -> BudgetResult<()>;
}

/// Read side of the expense store
pub trait ExpenseSource {
    fn list(&self) -> BudgetResult<Vec<Expense>>;
}

/// Main storage coordinator
pub struct Storage {
    paths: BudgetPaths,
    pub budget: BudgetRepository,
    pub expenses: ExpenseRepository,
    audit: AuditLogger,
    audit_enabled: bool,
}

impl Storage {
    /// Open storage rooted at `paths`, creating directories as needed
    pub fn new(paths: BudgetPaths) -> BudgetResult<Self> {
        paths.ensure_directories()?;
        let settings = Settings::load_or_create(&paths)?;

        Ok(Self {
            budget: BudgetRepository::new(paths.budget_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            audit: AuditLogger::new(paths.audit_log()),
            audit_enabled: settings.audit_enabled,
            paths,
        })
    }

    pub fn paths(&self) -> &BudgetPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Audit logger if auditing is switched on in the settings
    pub fn audit_logger(&self) -> Option<&AuditLogger> {
        self.audit_enabled.then_some(&self.audit)
    }

    /// Load the expense list into memory
    pub fn load_all(&self) -> BudgetResult<()> {
        self.expenses.load()
    }

    /// Whether `budget init` has been run
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> BudgetResult<()> {
        log_create(self.audit_logger(), entity_type, entity_id, entity_name, entity)
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> BudgetResult<()> {
        log_update(self.audit_logger(), entity_type, entity_id, entity_name, before, after)
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> BudgetResult<()> {
        log_delete(self.audit_logger(), entity_type, entity_id, entity_name, entity)
    }
}

pub(crate) fn log_create<T: Serialize>(
    logger: Option<&AuditLogger>,
    entity_type: EntityType,
    entity_id: impl Into<String>,
    entity_name: Option<String>,
    entity: &T,
) -> BudgetResult<()> {
    match logger {
        Some(logger) => logger.log(&AuditEntry::create(entity_type, entity_id, entity_name, entity)),
        None => Ok(()),
    }
}

/// Log an update with a field diff; unchanged entities are not logged
pub(crate) fn log_update<T: Serialize>(
    logger: Option<&AuditLogger>,
    entity_type: EntityType,
    entity_id: impl Into<String>,
    entity_name: Option<String>,
    before: &T,
    after: &T,
) -> BudgetResult<()> {
    let Some(logger) = logger else {
        return Ok(());
    };

    let before_json = serde_json::to_value(before)?;
    let after_json = serde_json::to_value(after)?;
    let Some(diff) = generate_diff(&before_json, &after_json) else {
        return Ok(());
    };

    logger.log(&AuditEntry::update(
        entity_type,
        entity_id,
        entity_name,
        before,
        after,
        Some(diff),
    ))
}

pub(crate) fn log_delete<T: Serialize>(
    logger: Option<&AuditLogger>,
    entity_type: EntityType,
    entity_id: impl Into<String>,
    entity_name: Option<String>,
    entity: &T,
) -> BudgetResult<()> {
    match logger {
        Some(logger) => logger.log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity)),
        None => Ok(()),
    }
}

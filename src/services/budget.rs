//! Budget service
//!
//! Owns the single budget record in memory and keeps it in sync with the
//! [`BudgetStore`]. Every operation computes the new record first, saves it,
//! and only then replaces the in-memory copy, so a failed save leaves the
//! service exactly as it was.

use chrono::{DateTime, TimeZone, Utc};

use crate::audit::{AuditLogger, EntityType};
use crate::error::BudgetResult;
use crate::models::over_limit::newest_first;
use crate::models::{BudgetConfig, BudgetData, BudgetState, ExpenseRef, Money, OverLimitRecord};
use crate::storage::{self, BudgetStore, ExpenseSource, Storage};

use super::allowance::{allowance, Allowance};
use super::overrun::{apply_spend, release_spend, SpendOutcome};
use super::patch::{apply_patch, BudgetPatch, CriticalChange};
use super::rollover::{reconcile_on_load, Rollover};

/// Audit id of the single budget record
const BUDGET_ENTITY_ID: &str = "budget";

/// Service for the daily budget
///
/// The stored record is read on the first [`load`](Self::load) or, failing
/// that, by the first mutation, so a mutation never starts from an empty
/// record while one exists in the store.
pub struct BudgetService<'a> {
    store: &'a dyn BudgetStore,
    expenses: &'a dyn ExpenseSource,
    audit: Option<&'a AuditLogger>,
    data: Option<BudgetData>,
    loaded: bool,
    rollover: Option<Rollover>,
}

impl<'a> BudgetService<'a> {
    /// Create a budget service backed by file storage
    pub fn new(storage: &'a Storage) -> Self {
        Self::with_ports(&storage.budget, &storage.expenses, storage.audit_logger())
    }

    /// Create a budget service over arbitrary ports
    pub fn with_ports(
        store: &'a dyn BudgetStore,
        expenses: &'a dyn ExpenseSource,
        audit: Option<&'a AuditLogger>,
    ) -> Self {
        Self {
            store,
            expenses,
            audit,
            data: None,
            loaded: false,
            rollover: None,
        }
    }

    /// Read the stored budget and bring it up to date for `now`
    ///
    /// Runs the day rollover and recomputes today's figures from the expense
    /// store. Saves only if something changed.
    pub fn load<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> BudgetResult<Option<&BudgetData>> {
        let Some(stored) = self.store.load()? else {
            self.loaded = true;
            self.data = None;
            self.rollover = None;
            return Ok(None);
        };

        let expenses = self.expenses.list()?;
        let reconciled = reconcile_on_load(&stored, &expenses, now);

        if reconciled.data != stored {
            save(self.store, &reconciled.data)?;
        }
        self.loaded = true;
        let data = self.data.insert(reconciled.data);
        self.rollover = reconciled.rollover;

        if let Some(rollover) = reconciled.rollover {
            tracing::info!(
                "new day: daily limit {} (base {}, carried over {} across {} days)",
                rollover.daily_limit,
                rollover.base_limit,
                rollover.unused_funds,
                rollover.spread_days
            );
            storage::log_update(
                self.audit,
                EntityType::Budget,
                BUDGET_ENTITY_ID,
                None,
                &stored,
                &*data,
            )?;
        }
        log_new_records(self.audit, &reconciled.new_records)?;

        Ok(Some(&*data))
    }

    /// Apply a configuration change and persist it
    pub fn apply<Tz: TimeZone>(
        &mut self,
        patch: BudgetPatch,
        now: &DateTime<Tz>,
    ) -> BudgetResult<&BudgetData> {
        self.ensure_loaded(now)?;
        let name = patch.name();
        let expenses = self.expenses.list()?;
        let patched = apply_patch(self.data.as_ref(), patch, &expenses, now)?;

        save(self.store, &patched.data)?;
        let before = self.data.take();
        let data = self.data.insert(patched.data);

        tracing::info!("{}: daily limit is now {}", name, data.state.daily_limit);

        match &before {
            Some(before) => storage::log_update(
                self.audit,
                EntityType::Budget,
                BUDGET_ENTITY_ID,
                None,
                before,
                &*data,
            )?,
            None => storage::log_create(self.audit, EntityType::Budget, BUDGET_ENTITY_ID, None, &*data)?,
        }

        match &patched.critical_change {
            Some(CriticalChange::Added(expense)) => storage::log_create(
                self.audit,
                EntityType::CriticalExpense,
                expense.id.to_string(),
                Some(expense.title.clone()),
                expense,
            )?,
            Some(CriticalChange::Removed(expense)) => storage::log_delete(
                self.audit,
                EntityType::CriticalExpense,
                expense.id.to_string(),
                Some(expense.title.clone()),
                expense,
            )?,
            None => {}
        }
        log_new_records(self.audit, &patched.new_records)?;

        Ok(&*data)
    }

    /// Subtract a just-recorded expense from today's remaining limit
    ///
    /// Returns `None` without touching storage when no budget is configured.
    /// Load the service before adding the expense to the store; a first load
    /// afterwards already counts it.
    pub fn record_spend<Tz: TimeZone>(
        &mut self,
        amount: Money,
        expense: Option<&ExpenseRef>,
        now: &DateTime<Tz>,
    ) -> BudgetResult<Option<SpendOutcome>> {
        self.ensure_loaded(now)?;
        let Some(current) = &self.data else {
            tracing::debug!("no budget configured, spend of {} not tracked", amount);
            return Ok(None);
        };

        let mut next = current.clone();
        let outcome = apply_spend(&mut next.state, amount, expense, now.with_timezone(&Utc));
        save(self.store, &next)?;
        self.data = Some(next);

        if let Some(record) = &outcome.record {
            tracing::info!("daily limit exceeded by {}", record.amount);
            log_new_records(self.audit, std::slice::from_ref(record))?;
        }

        Ok(Some(outcome))
    }

    /// Give a deleted expense's amount back to today's remaining limit
    pub fn release_spend<Tz: TimeZone>(
        &mut self,
        amount: Money,
        now: &DateTime<Tz>,
    ) -> BudgetResult<Option<&BudgetState>> {
        self.ensure_loaded(now)?;
        let Some(current) = &self.data else {
            return Ok(None);
        };

        let mut next = current.clone();
        release_spend(&mut next.state, amount);
        save(self.store, &next)?;

        Ok(Some(&self.data.insert(next).state))
    }

    /// Wipe the budget back to the zero-value record
    pub fn reset<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> BudgetResult<&BudgetData> {
        let initial = BudgetData::initial(now.with_timezone(&Utc));

        // An unreadable record can still be wiped
        let before = if self.loaded {
            self.data.clone()
        } else {
            self.store.load().unwrap_or_else(|err| {
                tracing::warn!("replacing unreadable budget: {err}");
                None
            })
        };
        save(self.store, &initial)?;

        self.loaded = true;
        self.rollover = None;
        let data = self.data.insert(initial);
        tracing::info!("budget reset");

        match &before {
            Some(before) => storage::log_update(
                self.audit,
                EntityType::Budget,
                BUDGET_ENTITY_ID,
                None,
                before,
                &*data,
            )?,
            None => storage::log_create(self.audit, EntityType::Budget, BUDGET_ENTITY_ID, None, &*data)?,
        }

        Ok(&*data)
    }

    fn ensure_loaded<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> BudgetResult<()> {
        if !self.loaded {
            tracing::debug!("budget not loaded yet, reading the stored record");
            self.load(now)?;
        }
        Ok(())
    }

    /// Day rollover performed by the last [`load`](Self::load), if any
    pub fn last_rollover(&self) -> Option<&Rollover> {
        self.rollover.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&BudgetData> {
        self.data.as_ref()
    }

    pub fn config(&self) -> Option<&BudgetConfig> {
        self.data.as_ref().map(|d| &d.config)
    }

    pub fn state(&self) -> Option<&BudgetState> {
        self.data.as_ref().map(|d| &d.state)
    }

    /// Cycle figures for `now` derived from the current configuration
    pub fn allowance<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<Allowance> {
        self.config().map(|config| allowance(config, now))
    }

    /// Over-limit records in the order they were recorded
    pub fn over_limit_history(&self) -> &[OverLimitRecord] {
        self.state()
            .map(|s| s.over_limit_history.as_slice())
            .unwrap_or_default()
    }

    /// Over-limit records, most recent first
    pub fn over_limit_history_newest_first(&self) -> Vec<OverLimitRecord> {
        newest_first(self.over_limit_history())
    }
}

fn save(store: &dyn BudgetStore, data: &BudgetData) -> BudgetResult<()> {
    store.save(data).map_err(|err| {
        tracing::warn!("could not save budget: {err}");
        err
    })
}

fn log_new_records(audit: Option<&AuditLogger>, records: &[OverLimitRecord]) -> BudgetResult<()> {
    for record in records {
        tracing::debug!("over-limit record {} for {}", record.id, record.amount);
        storage::log_create(
            audit,
            EntityType::OverLimitRecord,
            record.id.to_string(),
            record.expense_title.clone(),
            record,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Operation;
    use crate::config::BudgetPaths;
    use crate::error::BudgetError;
    use crate::models::{Expense, ExpenseId, NewExpense};
    use chrono::FixedOffset;
    use std::cell::{Cell, RefCell};
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryStore {
        record: RefCell<Option<BudgetData>>,
        saves: Cell<usize>,
        fail: Cell<bool>,
    }

    impl BudgetStore for MemoryStore {
        fn load(&self) -> BudgetResult<Option<BudgetData>> {
            Ok(self.record.borrow().clone())
        }

        fn save(&self, data: &BudgetData) -> BudgetResult<()> {
            if self.fail.get() {
                return Err(BudgetError::Storage("disk full".into()));
            }
            self.saves.set(self.saves.get() + 1);
            *self.record.borrow_mut() = Some(data.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemoryExpenses(RefCell<Vec<Expense>>);

    impl MemoryExpenses {
        fn push(&self, title: &str, amount: f64, when: DateTime<Utc>) -> Expense {
            let expense =
                NewExpense::new(title, Money::new(amount), "Food").into_expense(when.timestamp_millis());
            self.0.borrow_mut().push(expense.clone());
            expense
        }
    }

    impl ExpenseSource for MemoryExpenses {
        fn list(&self) -> BudgetResult<Vec<Expense>> {
            Ok(self.0.borrow().clone())
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn set_income(amount: f64) -> BudgetPatch {
        BudgetPatch::SetIncome {
            monthly_income: Money::new(amount),
            salary_date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_load_without_budget() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);

        assert!(service.load(&at(10, 9)).unwrap().is_none());
        assert!(!service.is_configured());
        assert!(service.over_limit_history().is_empty());
        assert_eq!(store.saves.get(), 0);
    }

    #[test]
    fn test_apply_persists_and_reload_is_stable() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);

        let created = service.apply(set_income(2900.0), &at(10, 9)).unwrap().clone();
        assert_eq!(store.saves.get(), 1);
        assert_eq!(store.record.borrow().as_ref(), Some(&created));

        // Same day, nothing new: nothing to save
        let mut reopened = BudgetService::with_ports(&store, &expenses, None);
        assert_eq!(reopened.load(&at(10, 20)).unwrap(), Some(&created));
        assert_eq!(store.saves.get(), 1);
    }

    #[test]
    fn test_next_day_carries_over_unused_funds() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);

        let limit = service.apply(set_income(2900.0), &at(9, 9)).unwrap().state.daily_limit;
        expenses.push("Lunch", 10.0, at(9, 12));
        service.load(&at(9, 13)).unwrap();

        let state = service.load(&at(10, 8)).unwrap().unwrap().state.clone();
        assert_eq!(state.unused_funds_yesterday, limit - Money::new(10.0));
        assert_eq!(state.saved_unused_funds, limit - Money::new(10.0));
        assert_eq!(
            service.last_rollover().map(|r| r.unused_funds),
            Some(limit - Money::new(10.0))
        );

        // Loading again the same day must not carry over twice
        let again = service.load(&at(10, 18)).unwrap().unwrap().state.clone();
        assert_eq!(again, state);
        assert!(service.last_rollover().is_none());
    }

    #[test]
    fn test_record_spend_past_limit() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(2900.0), &at(10, 9)).unwrap();

        let limit = service.state().unwrap().daily_limit;
        let taxi = ExpenseRef::new(ExpenseId::new(), "Taxi");
        let outcome = service
            .record_spend(limit + Money::new(30.0), Some(&taxi), &at(10, 10))
            .unwrap()
            .unwrap();

        assert!(outcome.exceeded());
        assert_eq!(outcome.overflow, (limit + Money::new(30.0)) - limit);
        assert_eq!(service.over_limit_history().len(), 1);
        assert_eq!(store.record.borrow().as_ref(), service.data());
    }

    #[test]
    fn test_unloaded_handle_builds_on_stored_record() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut first = BudgetService::with_ports(&store, &expenses, None);
        first.apply(set_income(0.0), &at(10, 9)).unwrap();
        first
            .apply(
                BudgetPatch::AddCriticalExpense {
                    title: "Rent".into(),
                    amount: Money::new(0.0),
                },
                &at(10, 9),
            )
            .unwrap();
        let taxi = ExpenseRef::new(ExpenseId::new(), "Taxi");
        first.record_spend(Money::new(50.0), Some(&taxi), &at(10, 10)).unwrap();

        // No load before the patch
        let mut second = BudgetService::with_ports(&store, &expenses, None);
        second.apply(set_income(3000.0), &at(10, 12)).unwrap();

        let stored = store.record.borrow().clone().unwrap();
        assert_eq!(stored.config.monthly_income, Money::new(3000.0));
        assert_eq!(stored.config.critical_expenses.len(), 1);
        assert_eq!(stored.state.over_limit_history.len(), 1);
        assert_eq!(stored.state.over_limit_history[0].expense_id, Some(taxi.id));

        let mut third = BudgetService::with_ports(&store, &expenses, None);
        let outcome = third.record_spend(Money::new(5.0), None, &at(10, 13)).unwrap();
        assert!(outcome.is_some());
        assert_eq!(third.over_limit_history().len(), 1);
    }

    #[test]
    fn test_fast_path_record_survives_reload_once() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(0.0), &at(10, 9)).unwrap();

        let laptop = expenses.push("Laptop", 900.0, at(10, 10));
        service
            .record_spend(laptop.amount, Some(&laptop.expense_ref()), &at(10, 10))
            .unwrap();

        let mut reopened = BudgetService::with_ports(&store, &expenses, None);
        let state = reopened.load(&at(10, 12)).unwrap().unwrap().state.clone();

        assert_eq!(state.over_limit_history.len(), 1);
        assert_eq!(state.over_limit_history[0].expense_id, Some(laptop.id));
        assert_eq!(state.over_limit_amount, Money::new(900.0));
        assert_eq!(state.over_limit_amount, -state.remaining_daily_limit);
    }

    #[test]
    fn test_record_spend_without_budget_is_ignored() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);

        let outcome = service
            .record_spend(Money::new(12.0), None, &at(10, 10))
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(store.saves.get(), 0);
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(2900.0), &at(10, 9)).unwrap();
        let before = service.data().cloned();

        store.fail.set(true);
        let err = service
            .apply(
                BudgetPatch::SetSavingsGoal {
                    amount: Money::new(100.0),
                },
                &at(10, 9),
            )
            .unwrap_err();
        assert!(matches!(err, BudgetError::Storage(_)));
        assert!(service.record_spend(Money::new(5.0), None, &at(10, 10)).is_err());
        assert!(service.release_spend(Money::new(5.0), &at(10, 10)).is_err());

        assert_eq!(service.data().cloned(), before);
    }

    #[test]
    fn test_release_spend_after_delete() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        // No income, so every spend is over the limit
        service.apply(set_income(0.0), &at(10, 9)).unwrap();

        service
            .record_spend(Money::new(5.0), None, &at(10, 10))
            .unwrap();
        assert_eq!(service.state().unwrap().over_limit_amount, Money::new(5.0));
        let state = service.release_spend(Money::new(5.0), &at(10, 10)).unwrap().unwrap();

        assert_eq!(state.remaining_daily_limit, Money::zero());
        assert_eq!(state.over_limit_amount, Money::zero());
    }

    #[test]
    fn test_reset() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(2900.0), &at(10, 9)).unwrap();

        let data = service.reset(&at(10, 11)).unwrap();

        assert_eq!(data, &BudgetData::initial(at(10, 11)));
        assert_eq!(store.record.borrow().as_ref(), Some(&BudgetData::initial(at(10, 11))));
    }

    #[test]
    fn test_mutations_take_local_instants() {
        let minsk = FixedOffset::east_opt(3 * 3600).unwrap();
        let local = |day, hour| at(day, hour).with_timezone(&minsk);
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(0.0), &local(10, 9)).unwrap();

        let taxi = ExpenseRef::new(ExpenseId::new(), "Taxi");
        service.record_spend(Money::new(40.0), Some(&taxi), &local(10, 10)).unwrap();
        assert_eq!(service.over_limit_history()[0].date, at(10, 10));

        let state = service.release_spend(Money::new(40.0), &local(10, 11)).unwrap().unwrap();
        assert!(state.over_limit_amount.is_zero());

        let data = service.reset(&local(10, 12)).unwrap();
        assert_eq!(data, &BudgetData::initial(at(10, 12)));
    }

    #[test]
    fn test_history_newest_first() {
        let store = MemoryStore::default();
        let expenses = MemoryExpenses::default();
        let mut service = BudgetService::with_ports(&store, &expenses, None);
        service.apply(set_income(0.0), &at(10, 9)).unwrap();

        let first = ExpenseRef::new(ExpenseId::new(), "First");
        let second = ExpenseRef::new(ExpenseId::new(), "Second");
        service.record_spend(Money::new(1.0), Some(&first), &at(10, 10)).unwrap();
        service.record_spend(Money::new(2.0), Some(&second), &at(10, 11)).unwrap();

        assert_eq!(service.over_limit_history()[0].expense_id, Some(first.id));
        assert_eq!(
            service.over_limit_history_newest_first()[0].expense_id,
            Some(second.id)
        );
    }

    #[test]
    fn test_file_storage_writes_audit_trail() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BudgetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        let mut service = BudgetService::new(&storage);

        service.apply(set_income(2900.0), &at(10, 9)).unwrap();
        service
            .apply(
                BudgetPatch::AddCriticalExpense {
                    title: "Rent".into(),
                    amount: Money::new(900.0),
                },
                &at(10, 9),
            )
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        let kinds: Vec<_> = entries
            .iter()
            .map(|e| (e.operation, e.entity_type))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (Operation::Create, EntityType::Budget),
                (Operation::Update, EntityType::Budget),
                (Operation::Create, EntityType::CriticalExpense),
            ]
        );

        let mut reopened = BudgetService::new(&storage);
        let loaded = reopened.load(&at(10, 12)).unwrap().unwrap();
        assert_eq!(loaded.config.critical_expenses.len(), 1);
    }
}

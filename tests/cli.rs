//! End-to-end tests for the `budget` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn budget(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("budget").unwrap();
    cmd.env("DAILY_BUDGET_DIR", dir.path()).env_remove("BUDGET_LOG");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = budget(dir).args(args).assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

/// Short id printed after "Recorded:"
fn recorded_id(stdout: &str) -> String {
    let start = stdout.find("(exp-").unwrap() + 1;
    stdout[start..start + 12].to_string()
}

#[test]
fn test_status_without_budget() {
    let dir = TempDir::new().unwrap();

    budget(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No budget configured yet."));
}

#[test]
fn test_init_writes_settings() {
    let dir = TempDir::new().unwrap();

    budget(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialization complete!"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").is_dir());
}

#[test]
fn test_overspend_is_reported_and_recorded() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);

    budget(&dir)
        .args(["expense", "add", "Laptop", "100000", "-c", "Tech"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded: Laptop 100000.00 BYN"))
        .stdout(predicate::str::contains("Daily limit exceeded by"));

    budget(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Over the daily limit by"));

    // Each later run reloads the record; the overrun stays a single entry
    let history = run(&dir, &["plan", "history"]);
    assert_eq!(history.matches("Laptop").count(), 1);
}

#[test]
fn test_small_spend_shows_what_is_left() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);

    budget(&dir)
        .args(["expense", "add", "Coffee", "3.50", "-c", "Restaurants"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Left for today:"));

    budget(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Spent today:      3.50 BYN"));
}

#[test]
fn test_removing_todays_expense_restores_limit() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);
    let added = run(&dir, &["expense", "add", "Taxi", "10", "-c", "Transport"]);
    let id = recorded_id(&added);

    budget(&dir)
        .args(["expense", "remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed: Taxi 10.00 BYN"));

    budget(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Spent today:      0.00 BYN"));
}

#[test]
fn test_expenses_are_recorded_without_budget() {
    let dir = TempDir::new().unwrap();
    let added = run(&dir, &["expense", "add", "Bread", "2", "-c", "Food"]);
    assert!(!added.contains("Left for today"));

    budget(&dir)
        .args(["expense", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bread"))
        .stdout(predicate::str::contains("1 expense(s), total 2.00 BYN"));

    budget(&dir)
        .args(["report", "categories"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Food"));
}

#[test]
fn test_edit_changes_amount() {
    let dir = TempDir::new().unwrap();
    let added = run(&dir, &["expense", "add", "Lunch", "12", "-c", "Food"]);
    let id = recorded_id(&added);

    run(&dir, &["expense", "edit", &id, "--amount", "15"]);

    budget(&dir)
        .args(["expense", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Amount:      15.00 BYN"));
}

#[test]
fn test_critical_expenses_lower_the_limit() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);
    run(&dir, &["plan", "add-critical", "Rent", "1000"]);
    run(&dir, &["plan", "set-savings", "500"]);

    budget(&dir)
        .args(["plan", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rent"))
        .stdout(predicate::str::contains("Discretionary:   1500.00 BYN"));
}

#[test]
fn test_invalid_input_fails() {
    let dir = TempDir::new().unwrap();

    budget(&dir)
        .args(["expense", "add", "Coffee", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid amount"));

    budget(&dir)
        .args(["plan", "set-savings", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No budget configured"));

    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);
    budget(&dir)
        .args(["plan", "remove-critical", "crit-00000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Critical expense not found"));

    budget(&dir)
        .args(["plan", "reset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_audit_log_lists_changes() {
    let dir = TempDir::new().unwrap();
    run(&dir, &["plan", "set-income", "3000", "--salary", "1"]);
    run(&dir, &["expense", "add", "Bread", "2", "-c", "Food"]);

    budget(&dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Budget budget"))
        .stdout(predicate::str::contains("CREATE Expense"));
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daily_budget::cli::{
    handle_budget_command, handle_expense_command, handle_report_command, handle_status,
};
use daily_budget::config::{BudgetPaths, Settings};
use daily_budget::storage::Storage;

/// Environment variable holding the log filter
const LOG_ENV: &str = "BUDGET_LOG";

#[derive(Parser)]
#[command(
    name = "budget",
    version,
    about = "Expense tracker with a rolling daily spending limit",
    long_about = "Spreads what is left of your monthly income after fixed costs and \
                  savings over the days until your next salary, and tracks every \
                  expense against today's limit."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's limit and what is left of it
    Status,

    /// Budget configuration commands
    #[command(subcommand)]
    Plan(daily_budget::cli::BudgetCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(daily_budget::cli::ExpenseCommands),

    /// Spending reports
    #[command(subcommand)]
    Report(daily_budget::cli::ReportCommands),

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = BudgetPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let now = chrono::Local::now();
    tracing::debug!("data directory {}", paths.base_dir().display());

    match cli.command {
        Some(Commands::Status) => handle_status(&storage, &settings, now)?,
        Some(Commands::Plan(cmd)) => handle_budget_command(&storage, &settings, now, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, now, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, now, cmd)?,
        Some(Commands::Audit { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        Some(Commands::Init) => {
            println!("Initializing daily-budget at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next, set your income and salary day:");
            println!("  budget plan set-income 3000 --salary 15");
        }
        Some(Commands::Config) => {
            println!("daily-budget Configuration");
            println!("==========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Budget file:     {}", paths.budget_file().display());
            println!("Expenses file:   {}", paths.expenses_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency:      {}", settings.currency_symbol);
            println!("  Date format:   {}", settings.date_format);
            println!("  Audit enabled: {}", settings.audit_enabled);
        }
        None => {
            println!("daily-budget - rolling daily spending limit");
            println!();
            println!("Run 'budget --help' for usage information.");
            println!("Run 'budget status' to see today's limit.");
        }
    }

    Ok(())
}

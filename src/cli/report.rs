//! CLI commands for reports

use chrono::{DateTime, Datelike, Local, TimeDelta, Utc};
use clap::Subcommand;

use super::{date_range, open_budget};
use crate::config::settings::Settings;
use crate::display::report::format_header;
use crate::error::BudgetResult;
use crate::models::{Expense, ExpenseFilter};
use crate::reports::{
    CategoryReport, KeyMetrics, MonthlyReport, OverLimitSummary, PeriodTotals, TimeOfDayReport,
    UnusedFundsStats,
};
use crate::services::ExpenseService;
use crate::storage::Storage;

/// Length of the metrics period when no dates are given
const DEFAULT_METRICS_DAYS: i64 = 30;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Spending by category
    Categories {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Spending by time of day
    #[command(alias = "tod")]
    TimeOfDay {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Spending per month of a year
    Monthly {
        /// Year, defaults to the current one
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Total, daily average and change against the previous period
    Metrics {
        /// Start date (YYYY-MM-DD), defaults to 30 days before the end
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD), defaults to now
        #[arg(long)]
        to: Option<String>,
    },

    /// Month and year totals, carry-over savings and overruns
    Summary,
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    now: DateTime<Local>,
    cmd: ReportCommands,
) -> BudgetResult<()> {
    let service = ExpenseService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Categories { from, to } => {
            let expenses = in_range(&service, from.as_deref(), to.as_deref())?;
            println!("{}", format_header("Spending by Category", 48));
            print!("{}", CategoryReport::generate(&expenses).format_terminal(symbol));
        }

        ReportCommands::TimeOfDay { from, to } => {
            let expenses = in_range(&service, from.as_deref(), to.as_deref())?;
            println!("{}", format_header("Spending by Time of Day", 48));
            print!(
                "{}",
                TimeOfDayReport::generate(&expenses, &Local).format_terminal(symbol)
            );
        }

        ReportCommands::Monthly { year } => {
            let year = year.unwrap_or_else(|| now.year());
            let report = MonthlyReport::generate(&service.list()?, year, &Local);
            print!("{}", report.format_terminal(symbol));
        }

        ReportCommands::Metrics { from, to } => {
            let (start, end) = date_range(from.as_deref(), to.as_deref())?;
            let end = end.unwrap_or_else(|| now.with_timezone(&Utc));
            let start = start.unwrap_or(end - TimeDelta::days(DEFAULT_METRICS_DAYS));
            let length = end - start;

            let all = service.list()?;
            let current = between(&all, start, end);
            let previous = between(&all, start - length, start - TimeDelta::milliseconds(1));

            println!(
                "{}",
                format_header(
                    &format!(
                        "{} to {}",
                        start.with_timezone(&Local).format(&settings.date_format),
                        end.with_timezone(&Local).format(&settings.date_format)
                    ),
                    48
                )
            );
            print!(
                "{}",
                KeyMetrics::generate(&current, &previous, Some((start, end))).format_terminal(symbol)
            );
        }

        ReportCommands::Summary => {
            let budget = open_budget(storage, settings, &now)?;
            let expenses = service.list()?;

            println!("{}", format_header("Summary", 48));
            print!("{}", PeriodTotals::generate(&expenses, &now).format_terminal(symbol));

            if let Some(data) = budget.data() {
                println!();
                print!("{}", UnusedFundsStats::from_budget(data).format_terminal(symbol));
                println!();
                print!(
                    "{}",
                    OverLimitSummary::generate(budget.over_limit_history(), &Local)
                        .format_terminal(symbol, &settings.date_format)
                );
            }
        }
    }

    Ok(())
}

fn in_range(service: &ExpenseService, from: Option<&str>, to: Option<&str>) -> BudgetResult<Vec<Expense>> {
    let (start, end) = date_range(from, to)?;
    let filter = ExpenseFilter {
        start: start.map(|t| t.timestamp_millis()),
        end: end.map(|t| t.timestamp_millis()),
        ..Default::default()
    };
    Ok(filter.apply(&service.list()?))
}

fn between(expenses: &[Expense], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Expense> {
    ExpenseFilter {
        start: Some(start.timestamp_millis()),
        end: Some(end.timestamp_millis()),
        ..Default::default()
    }
    .apply(expenses)
}

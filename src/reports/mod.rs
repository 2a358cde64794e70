//! Analytics over the expense list and the budget record
//!
//! Every report is a pure function of its inputs; the caller supplies the
//! timezone and the current time.

pub mod category;
pub mod metrics;
pub mod monthly;
pub mod time_of_day;

pub use category::{CategoryReport, CategoryRow};
pub use metrics::{KeyMetrics, OverLimitSummary, OverrunDay, UnusedFundsStats};
pub use monthly::{MonthlyReport, PeriodTotals};
pub use time_of_day::{TimeOfDay, TimeOfDayReport};

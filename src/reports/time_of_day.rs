//! Spending by time of day

use std::fmt;

use chrono::{TimeZone, Timelike};

use crate::display::report::{format_bar, separator};
use crate::models::{Expense, Money};

/// Part of the day an expense falls into, by local hour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 23:59
    Evening,
    /// 00:00 - 05:59
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=23 => Self::Evening,
            _ => Self::Night,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        };
        f.write_str(label)
    }
}

/// Totals per part of the day
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeOfDayReport {
    pub morning: Money,
    pub afternoon: Money,
    pub evening: Money,
    pub night: Money,
}

impl TimeOfDayReport {
    pub fn generate<Tz: TimeZone>(expenses: &[Expense], tz: &Tz) -> Self {
        let mut report = Self::default();
        for expense in expenses {
            let Some(local) = expense.local_time(tz) else {
                continue;
            };
            *report.bucket_mut(TimeOfDay::from_hour(local.hour())) += expense.amount;
        }
        report
    }

    pub fn get(&self, part: TimeOfDay) -> Money {
        match part {
            TimeOfDay::Morning => self.morning,
            TimeOfDay::Afternoon => self.afternoon,
            TimeOfDay::Evening => self.evening,
            TimeOfDay::Night => self.night,
        }
    }

    fn bucket_mut(&mut self, part: TimeOfDay) -> &mut Money {
        match part {
            TimeOfDay::Morning => &mut self.morning,
            TimeOfDay::Afternoon => &mut self.afternoon,
            TimeOfDay::Evening => &mut self.evening,
            TimeOfDay::Night => &mut self.night,
        }
    }

    pub fn has_data(&self) -> bool {
        TimeOfDay::ALL.iter().any(|part| self.get(*part).is_positive())
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        if !self.has_data() {
            return "No expenses recorded.\n".to_string();
        }

        let max = TimeOfDay::ALL
            .iter()
            .map(|part| self.get(*part).amount())
            .fold(0.0, f64::max);

        let mut output = String::new();
        output.push_str(&format!("{:<10} {:>14}\n", "Time", "Total"));
        output.push_str(&separator(40));
        output.push('\n');
        for part in TimeOfDay::ALL {
            let amount = self.get(part);
            output.push_str(&format!(
                "{:<10} {:>14} {}\n",
                part.to_string(),
                amount.format_with_symbol(symbol),
                format_bar(amount.amount(), max, 12)
            ));
        }
        output
    }
}

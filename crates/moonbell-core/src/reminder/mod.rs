//! Reminder offsets and due-reminder evaluation.

mod evaluator;

pub use evaluator::{DueReminder, Evaluator};

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How far ahead of an occurrence a reminder fires.
///
/// Closed set; the active subset comes from configuration, extending it
/// means a redeploy. The string forms double as config values and dedup
/// keys, so renaming a variant invalidates history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderOffset {
    SameDay,
    DayBefore,
    WeekBefore,
    /// One calendar month ahead; yearly events only, as in the source
    /// calendar's anniversary semantics.
    MonthBefore,
}

impl ReminderOffset {
    pub const ALL: [ReminderOffset; 4] = [
        ReminderOffset::SameDay,
        ReminderOffset::DayBefore,
        ReminderOffset::WeekBefore,
        ReminderOffset::MonthBefore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderOffset::SameDay => "same-day",
            ReminderOffset::DayBefore => "day-before",
            ReminderOffset::WeekBefore => "week-before",
            ReminderOffset::MonthBefore => "month-before",
        }
    }

    /// Date the reminder triggers for a given occurrence date.
    ///
    /// `None` only when the subtraction leaves the calendar (occurrence at
    /// the far edge of the supported range).
    pub fn trigger_date(&self, occurrence: NaiveDate) -> Option<NaiveDate> {
        match self {
            ReminderOffset::SameDay => Some(occurrence),
            ReminderOffset::DayBefore => occurrence.checked_sub_days(Days::new(1)),
            ReminderOffset::WeekBefore => occurrence.checked_sub_days(Days::new(7)),
            ReminderOffset::MonthBefore => occurrence.checked_sub_months(Months::new(1)),
        }
    }

    /// Month-ahead reminders only make sense for yearly recurrences.
    pub fn applies_to(&self, yearly: bool) -> bool {
        !matches!(self, ReminderOffset::MonthBefore) || yearly
    }

    /// Korean label used in notification messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReminderOffset::SameDay => "오늘",
            ReminderOffset::DayBefore => "내일",
            ReminderOffset::WeekBefore => "1주일 후",
            ReminderOffset::MonthBefore => "1개월 후",
        }
    }
}

impl fmt::Display for ReminderOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderOffset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "same-day" => Ok(ReminderOffset::SameDay),
            "day-before" => Ok(ReminderOffset::DayBefore),
            "week-before" => Ok(ReminderOffset::WeekBefore),
            "month-before" => Ok(ReminderOffset::MonthBefore),
            other => Err(format!("unknown reminder offset: {other}")),
        }
    }
}

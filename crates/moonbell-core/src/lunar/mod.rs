//! Korean lunar calendar conversion.
//!
//! Both directions walk the embedded month-length table from the 1900-01-31
//! epoch. Conversions are pure functions: same input, same output, no
//! state. Dates outside the table range fail with [`LunarError`] rather
//! than extrapolating.

mod table;

pub use table::{FIRST_YEAR, LAST_YEAR};

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::LunarError;

/// A date in the lunar calendar. Value type, no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// True when the date falls in the year's inserted leap month.
    pub is_leap_month: bool,
}

impl LunarDate {
    pub fn new(year: i32, month: u32, day: u32, is_leap_month: bool) -> Self {
        Self {
            year,
            month,
            day,
            is_leap_month,
        }
    }
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if self.is_leap_month {
            write!(f, " (윤)")?;
        }
        Ok(())
    }
}

fn epoch() -> NaiveDate {
    let (y, m, d) = table::EPOCH_YMD;
    NaiveDate::from_ymd_opt(y, m, d).expect("table epoch is a valid date")
}

fn year_info(year: i32) -> Result<u32, LunarError> {
    table::info(year).ok_or(LunarError::OutOfRange {
        year,
        min: FIRST_YEAR,
        max: LAST_YEAR,
    })
}

/// Leap month number of `year` (1-12), or `None` if the year has none.
pub fn leap_month(year: i32) -> Result<Option<u32>, LunarError> {
    let info = year_info(year)?;
    let m = info & 0xF;
    Ok(if m == 0 { None } else { Some(m) })
}

fn leap_month_days(info: u32) -> i64 {
    if info & 0xF == 0 {
        0
    } else if info & 0x10000 != 0 {
        30
    } else {
        29
    }
}

fn month_days(info: u32, month: u32) -> i64 {
    if info & (0x8000 >> (month - 1)) != 0 {
        30
    } else {
        29
    }
}

/// Number of days in a lunar month. `leap` selects the year's inserted
/// leap month, which must exist and match `month`.
pub fn days_in_month(year: i32, month: u32, leap: bool) -> Result<u32, LunarError> {
    let info = year_info(year)?;
    if !(1..=12).contains(&month) {
        return Err(LunarError::NoSuchDay {
            year,
            month,
            day: 1,
            leap,
        });
    }
    if leap {
        if info & 0xF != month {
            return Err(LunarError::NoSuchDay {
                year,
                month,
                day: 1,
                leap,
            });
        }
        Ok(leap_month_days(info) as u32)
    } else {
        Ok(month_days(info, month) as u32)
    }
}

fn days_in_year(info: u32) -> i64 {
    (1..=12).map(|m| month_days(info, m)).sum::<i64>() + leap_month_days(info)
}

/// Convert a lunar date to the corresponding solar (Gregorian) date.
pub fn lunar_to_solar(lunar: &LunarDate) -> Result<NaiveDate, LunarError> {
    let info = year_info(lunar.year)?;
    let no_such_day = LunarError::NoSuchDay {
        year: lunar.year,
        month: lunar.month,
        day: lunar.day,
        leap: lunar.is_leap_month,
    };

    if !(1..=12).contains(&lunar.month) || lunar.day < 1 {
        return Err(no_such_day);
    }
    if lunar.day > days_in_month(lunar.year, lunar.month, lunar.is_leap_month)? {
        return Err(no_such_day);
    }

    let mut offset: i64 = 0;
    for y in FIRST_YEAR..lunar.year {
        // years before lunar.year are inside the table by construction
        offset += days_in_year(table::info(y).unwrap_or(0));
    }

    let leap = info & 0xF;
    for m in 1..lunar.month {
        offset += month_days(info, m);
        if m == leap {
            offset += leap_month_days(info);
        }
    }
    if lunar.is_leap_month {
        // the leap month follows its ordinary month
        offset += month_days(info, lunar.month);
    }
    offset += (lunar.day - 1) as i64;

    Ok(epoch() + Duration::days(offset))
}

/// Convert a solar (Gregorian) date to the corresponding lunar date.
pub fn solar_to_lunar(date: NaiveDate) -> Result<LunarDate, LunarError> {
    let mut offset = (date - epoch()).num_days();
    if offset < 0 {
        return Err(LunarError::DateOutOfRange { date });
    }

    let mut year = FIRST_YEAR;
    loop {
        let info = year_info(year).map_err(|_| LunarError::DateOutOfRange { date })?;
        let ydays = days_in_year(info);
        if offset < ydays {
            break;
        }
        offset -= ydays;
        year += 1;
    }

    let info = year_info(year)?;
    let leap = info & 0xF;
    let mut month = 1u32;
    let mut is_leap_month = false;
    loop {
        let mdays = month_days(info, month);
        if offset < mdays {
            break;
        }
        offset -= mdays;
        if month == leap {
            let ldays = leap_month_days(info);
            if offset < ldays {
                is_leap_month = true;
                break;
            }
            offset -= ldays;
        }
        month += 1;
    }

    Ok(LunarDate {
        year,
        month,
        day: (offset + 1) as u32,
        is_leap_month,
    })
}

/// Last solar day the table can convert (lunar 2049-12-29).
pub fn last_supported_day() -> NaiveDate {
    let last_info = table::info(LAST_YEAR).unwrap_or(0);
    let last_month_days = month_days(last_info, 12) as u32;
    lunar_to_solar(&LunarDate::new(LAST_YEAR, 12, last_month_days, false))
        .expect("last table day converts")
}

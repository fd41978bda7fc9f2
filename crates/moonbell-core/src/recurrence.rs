//! Recurrence resolution for yearly events.
//!
//! Maps a yearly event (lunar-anchored or plain Gregorian) to its concrete
//! occurrence date: this year's if it has not passed, otherwise next
//! year's. An anchor with no valid day in the target year (leap-only
//! anchor, day 30 of a 29-day month, Feb 29) skips that year's occurrence
//! instead of shifting to a neighboring day.

use chrono::{Datelike, NaiveDate};

use crate::error::LunarError;
use crate::event::{Event, EventKind, LunarAnchor};
use crate::lunar::{self, LunarDate};

/// A concrete (event, occurrence date) pair for one tick.
#[derive(Debug, Clone)]
pub struct Occurrence {
    pub event: Event,
    pub date: NaiveDate,
}

/// An occurrence that could not be resolved, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedEvent {
    pub uid: String,
    pub summary: String,
    pub reason: LunarError,
}

/// Outcome of resolving a batch of events.
#[derive(Debug, Default)]
pub struct Resolution {
    pub occurrences: Vec<Occurrence>,
    pub skipped: Vec<SkippedEvent>,
}

/// Solar date of a lunar anchor in `year`.
pub fn lunar_occurrence_in_year(anchor: &LunarAnchor, year: i32) -> Result<NaiveDate, LunarError> {
    lunar::lunar_to_solar(&LunarDate::new(year, anchor.month, anchor.day, anchor.leap))
}

/// Next occurrence of a lunar anchor on or after `today`.
///
/// Tries `today`'s year, then the following year. `Ok(None)` means both
/// years lack the anchored day (skip policy); `OutOfRange` propagates.
pub fn next_lunar_occurrence(
    anchor: &LunarAnchor,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, LunarError> {
    next_lunar_occurrence_in_range(anchor, today, (lunar::FIRST_YEAR, lunar::LAST_YEAR))
}

/// [`next_lunar_occurrence`] restricted to a configured year range.
///
/// A candidate year outside the range fails with `OutOfRange` before the
/// table is consulted, so a narrowed configuration behaves like a
/// narrowed table.
pub fn next_lunar_occurrence_in_range(
    anchor: &LunarAnchor,
    today: NaiveDate,
    (min, max): (i32, i32),
) -> Result<Option<NaiveDate>, LunarError> {
    for year in [today.year(), today.year() + 1] {
        if year < min || year > max {
            return Err(LunarError::OutOfRange { year, min, max });
        }
        match lunar_occurrence_in_year(anchor, year) {
            Ok(date) if date >= today => return Ok(Some(date)),
            Ok(_past) => continue,
            Err(LunarError::NoSuchDay { .. }) => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}

/// Next occurrence of a plain yearly event (by calendar month/day) on or
/// after `today`. `None` when neither year has the day (Feb 29 anchors).
pub fn next_solar_occurrence(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    for year in [today.year(), today.year() + 1] {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if date >= today {
                return Some(date);
            }
        }
    }
    None
}

/// Resolve fetched events into concrete occurrences.
///
/// Yearly events materialize via [`next_lunar_occurrence_in_range`] /
/// [`next_solar_occurrence`]; one-shot events pass their own start date
/// through when it has not passed.
pub fn resolve_events(
    events: &[Event],
    today: NaiveDate,
    year_range: (i32, i32),
) -> Resolution {
    let mut resolution = Resolution::default();

    for event in events {
        let resolved: Result<Option<NaiveDate>, LunarError> = match (&event.kind, event.yearly) {
            (EventKind::Lunar(anchor), true) => {
                next_lunar_occurrence_in_range(anchor, today, year_range)
            }
            (_, true) => Ok(next_solar_occurrence(
                event.start.date().month(),
                event.start.date().day(),
                today,
            )),
            (_, false) => Ok(Some(event.start.date()).filter(|d| *d >= today)),
        };

        match resolved {
            Ok(Some(date)) => resolution.occurrences.push(Occurrence {
                event: event.clone(),
                date,
            }),
            Ok(None) => {}
            Err(reason) => resolution.skipped.push(SkippedEvent {
                uid: event.uid.clone(),
                summary: event.summary.clone(),
                reason,
            }),
        }
    }

    resolution
        .occurrences
        .sort_by(|a, b| (a.date, &a.event.summary).cmp(&(b.date, &b.event.summary)));
    resolution
}

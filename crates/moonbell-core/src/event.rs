//! Calendar event model.
//!
//! The lunar marker in an event summary is parsed exactly once, at
//! ingestion; everything downstream dispatches on the tagged [`EventKind`]
//! instead of re-scanning title strings.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Lunar (month, day) anchor extracted from an event summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarAnchor {
    pub month: u32,
    pub day: u32,
    /// Anchored to the year's leap month (marker carried 윤).
    pub leap: bool,
}

/// How an event's yearly occurrence date is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Ordinary Gregorian event; occurrences come from the start date.
    Solar,
    /// Lunar-anchored event; occurrences require table conversion.
    Lunar(LunarAnchor),
}

/// Immutable snapshot of a calendar event for one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier (ICS UID).
    pub uid: String,
    pub summary: String,
    /// Start in the configured zone, naive.
    pub start: NaiveDateTime,
    pub all_day: bool,
    /// FREQ=YEARLY recurrence.
    pub yearly: bool,
    pub kind: EventKind,
}

impl Event {
    /// Build an event, tagging it Lunar when it is yearly and the summary
    /// carries a lunar marker.
    pub fn ingest(
        uid: impl Into<String>,
        summary: impl Into<String>,
        start: NaiveDateTime,
        all_day: bool,
        yearly: bool,
    ) -> Self {
        let summary = summary.into();
        let kind = if yearly {
            parse_lunar_marker(&summary)
                .map(EventKind::Lunar)
                .unwrap_or(EventKind::Solar)
        } else {
            EventKind::Solar
        };
        Self {
            uid: uid.into(),
            summary,
            start,
            all_day,
            yearly,
            kind,
        }
    }

    /// All-day event starting at midnight.
    pub fn ingest_all_day(
        uid: impl Into<String>,
        summary: impl Into<String>,
        date: NaiveDate,
        yearly: bool,
    ) -> Self {
        Self::ingest(
            uid,
            summary,
            date.and_time(NaiveTime::MIN),
            true,
            yearly,
        )
    }

    /// Summaries containing 생일/생신 get birthday framing in messages.
    pub fn is_birthday(&self) -> bool {
        self.summary.contains("생일") || self.summary.contains("생신")
    }
}

/// Extract a lunar anchor from an event summary.
///
/// Accepted forms (from real calendar entries):
/// `(음력 3월 15일)`, `(음력 윤4월 8일)`, `(음 3/15)`, `(음력 3.15)`.
pub fn parse_lunar_marker(summary: &str) -> Option<LunarAnchor> {
    let start = summary.find("(음")?;
    let rest = &summary[start + "(음".len()..];
    let rest = rest.strip_prefix('력').unwrap_or(rest).trim_start();
    let (leap, rest) = match rest.strip_prefix('윤') {
        Some(r) => (true, r.trim_start()),
        None => (false, rest),
    };

    let (month, rest) = take_number(rest)?;
    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix('월')
        .or_else(|| rest.strip_prefix('/'))
        .or_else(|| rest.strip_prefix('.'))?
        .trim_start();
    let (day, rest) = take_number(rest)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('일').unwrap_or(rest).trim_start();
    if !rest.starts_with(')') {
        return None;
    }

    if !(1..=12).contains(&month) || !(1..=30).contains(&day) {
        return None;
    }
    Some(LunarAnchor { month, day, leap })
}

fn take_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 || end > 2 {
        return None;
    }
    let n = s[..end].parse().ok()?;
    Some((n, &s[end..]))
}

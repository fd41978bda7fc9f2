//! Notification message formatting.
//!
//! Reminders are grouped per occurrence date under a weekday header and
//! rendered as Telegram HTML. Groups that would exceed the message size
//! limit fall back to one message per reminder.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::event::EventKind;
use crate::reminder::{DueReminder, ReminderOffset};

/// Soft cap below Telegram's 4096-char hard limit.
pub const MAX_MESSAGE_LEN: usize = 4000;

const WEEKDAYS_KO: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];

/// Escape text for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn date_header(date: NaiveDate) -> String {
    let weekday = WEEKDAYS_KO[date.weekday().num_days_from_monday() as usize];
    format!("<b>🗓️ {} ({weekday}) 알림</b>", date.format("%Y-%m-%d"))
}

/// One rendered reminder line.
fn format_reminder(reminder: &DueReminder) -> String {
    let summary = escape_html(&reminder.event.summary);
    let date = reminder.occurrence.format("%m/%d");

    let mut line = match reminder.offset {
        ReminderOffset::SameDay => format!("오늘은 <b>{summary}</b> ({date}) 입니다! 🎉"),
        ReminderOffset::DayBefore | ReminderOffset::WeekBefore => {
            format!("📌 {} ({date}) : <b>{summary}</b>", reminder.offset.label())
        }
        ReminderOffset::MonthBefore => {
            format!("🗓️ {} ({date}) : <b>{summary}</b>", reminder.offset.label())
        }
    };

    if let EventKind::Lunar(anchor) = reminder.event.kind {
        line.push_str(&format!(
            " (음력 {}/{}{})",
            anchor.month,
            anchor.day,
            if anchor.leap { " 윤" } else { "" }
        ));
    }
    if reminder.event.is_birthday() {
        line = format!("🎂🎉 {line}");
    }
    line
}

/// Render due reminders into messages, grouped per occurrence date.
pub fn format_messages(due: &[DueReminder]) -> Vec<String> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&DueReminder>> = BTreeMap::new();
    for reminder in due {
        by_date.entry(reminder.occurrence).or_default().push(reminder);
    }

    let mut messages = Vec::new();
    for (date, reminders) in by_date {
        let header = date_header(date);
        let lines: Vec<String> = reminders.iter().map(|r| format_reminder(r)).collect();
        let combined = format!("{header}\n\n{}", lines.join("\n\n"));

        if combined.chars().count() <= MAX_MESSAGE_LEN {
            messages.push(combined);
        } else {
            // oversized digest: header once, then each reminder on its own
            messages.push(format!("{header}\n(메시지가 길어 개별 전송합니다)"));
            messages.extend(lines);
        }
    }
    messages
}

//! ICS to [`Event`] ingestion using the icalendar crate's parser.

use chrono::{NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use icalendar::parser::{read_calendar, unfold, Component};
use icalendar::DatePerhapsTime;

use crate::event::Event;

/// Parse every VEVENT in an ICS payload into an [`Event`].
///
/// Components without a UID or DTSTART are dropped. All start times are
/// normalized to naive local time in `tz`; the original's mixed-offset
/// feeds made naive-in-one-zone the only workable comparison basis.
pub fn ingest_ics(content: &str, tz: Tz) -> Vec<Event> {
    let unfolded = unfold(content);
    let Ok(calendar) = read_calendar(&unfolded) else {
        return Vec::new();
    };

    calendar
        .components
        .iter()
        .filter(|c| c.name == "VEVENT")
        .filter_map(|vevent| ingest_vevent(vevent, tz))
        .collect()
}

fn ingest_vevent(vevent: &Component, tz: Tz) -> Option<Event> {
    let uid = vevent.find_prop("UID")?.val.to_string();
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| "(제목 없음)".to_string());

    let dtstart = DatePerhapsTime::try_from(vevent.find_prop("DTSTART")?).ok()?;
    let (start, all_day) = normalize_start(dtstart, tz)?;

    let yearly = vevent
        .find_prop("RRULE")
        .map(|p| p.val.as_ref().to_uppercase().contains("FREQ=YEARLY"))
        .unwrap_or(false);

    Some(Event::ingest(uid, summary, start, all_day, yearly))
}

/// Normalize a DTSTART to naive local time in the configured zone.
fn normalize_start(dpt: DatePerhapsTime, tz: Tz) -> Option<(NaiveDateTime, bool)> {
    match dpt {
        DatePerhapsTime::Date(d) => Some((d.and_time(NaiveTime::MIN), true)),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => {
                Some((dt.with_timezone(&tz).naive_local(), false))
            }
            icalendar::CalendarDateTime::Floating(naive) => Some((naive, false)),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                let local = match tzid.parse::<Tz>() {
                    Ok(src) => date_time
                        .and_local_timezone(src)
                        .single()
                        .map(|dt| dt.with_timezone(&tz).naive_local())
                        .unwrap_or(date_time),
                    // unknown TZID: treat as already-local
                    Err(_) => date_time,
                };
                Some((local, false))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::{Datelike, NaiveDate, Timelike};

    const SEOUL: Tz = chrono_tz::Asia::Seoul;

    #[test]
    fn test_ingest_all_day_yearly_lunar() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:birthday-1\r\n\
SUMMARY:어머니 생신 (음력 3월 15일)\r\n\
DTSTART;VALUE=DATE:20240423\r\n\
RRULE:FREQ=YEARLY\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let events = ingest_ics(ics, SEOUL);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.uid, "birthday-1");
        assert!(event.all_day);
        assert!(event.yearly);
        assert!(matches!(event.kind, EventKind::Lunar(_)));
        assert_eq!(event.start.date(), NaiveDate::from_ymd_opt(2024, 4, 23).unwrap());
    }

    #[test]
    fn test_ingest_utc_datetime_converts_to_zone() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:meeting-1\r\n\
SUMMARY:팀 회의\r\n\
DTSTART:20250411T230000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let events = ingest_ics(ics, SEOUL);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        // 23:00 UTC is 08:00 next day in Seoul
        assert_eq!(event.start.date().day(), 12);
        assert_eq!(event.start.time().hour(), 8);
        assert!(!event.yearly);
        assert_eq!(event.kind, EventKind::Solar);
    }

    #[test]
    fn test_ingest_skips_events_without_uid() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:UID 없는 일정\r\n\
DTSTART;VALUE=DATE:20250412\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        assert!(ingest_ics(ics, SEOUL).is_empty());
    }

    #[test]
    fn test_ingest_multiple_vevents() {
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:a\r\n\
SUMMARY:하나\r\n\
DTSTART;VALUE=DATE:20250412\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
UID:b\r\n\
SUMMARY:둘\r\n\
DTSTART;VALUE=DATE:20250413\r\n\
END:VEVENT\r\n\
END:VCALENDAR";

        let events = ingest_ics(ics, SEOUL);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_ingest_garbage_is_empty() {
        assert!(ingest_ics("not an ics payload", SEOUL).is_empty());
    }
}

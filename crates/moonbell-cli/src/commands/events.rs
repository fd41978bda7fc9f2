use chrono::Days;
use moonbell_core::caldav::{CaldavClient, CalendarSource};
use moonbell_core::event::EventKind;
use moonbell_core::recurrence::resolve_events;
use moonbell_core::storage::Config;
use serde_json::json;

pub fn run(days: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.validate()?;
    let tz = config.tz()?;
    let client = CaldavClient::new(&config.calendar, tz)?;

    let today = chrono::Utc::now().with_timezone(&tz).date_naive();
    let horizon_days = days.unwrap_or(config.reminders.horizon_days);
    let horizon = today
        .checked_add_days(Days::new(horizon_days as u64))
        .unwrap_or(today);

    let events = client.fetch_events(today, horizon)?;
    let resolution = resolve_events(&events, today, config.lunar.range());

    for skipped in &resolution.skipped {
        eprintln!("skipped '{}': {}", skipped.summary, skipped.reason);
    }

    let listing: Vec<serde_json::Value> = resolution
        .occurrences
        .iter()
        .map(|occ| {
            let lunar = match &occ.event.kind {
                EventKind::Lunar(anchor) => Some(format!(
                    "{}/{}{}",
                    anchor.month,
                    anchor.day,
                    if anchor.leap { " 윤" } else { "" }
                )),
                EventKind::Solar => None,
            };
            json!({
                "date": occ.date.to_string(),
                "uid": occ.event.uid,
                "summary": occ.event.summary,
                "yearly": occ.event.yearly,
                "lunar": lunar,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&listing)?);
    Ok(())
}

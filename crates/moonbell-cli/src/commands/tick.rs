use chrono::NaiveDateTime;
use moonbell_core::storage::Config;
use moonbell_core::ReminderBot;

pub fn run(at: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bot = ReminderBot::from_config(config)?;

    let now = match at {
        Some(raw) => NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M")?,
        None => bot.now_local(),
    };

    let report = bot.run_tick_at(now)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

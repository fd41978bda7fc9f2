use moonbell_core::storage::Config;
use moonbell_core::ReminderBot;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let bot = ReminderBot::from_config(config)?;
    eprintln!("moonbell: ticking every {} minutes", bot.tick_minutes());
    bot.run();
    Ok(())
}

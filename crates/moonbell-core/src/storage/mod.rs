mod config;
pub mod sent_db;

pub use config::{
    CalendarConfig, Config, LunarConfig, ReminderConfig, TelegramConfig,
};
pub use sent_db::{SentDb, SentRecord, SentStore};

use std::path::PathBuf;

/// Returns `~/.config/moonbell[-dev]/` based on MOONBELL_ENV.
///
/// Set MOONBELL_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MOONBELL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("moonbell-dev")
    } else {
        base_dir.join("moonbell")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

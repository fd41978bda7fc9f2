//! TOML-based bot configuration.
//!
//! Stores connection and scheduling settings:
//! - CalDAV server and collections to poll
//! - Telegram bot token and target chat
//! - Reminder offsets, fire time, tick interval, lookahead horizon
//! - Lunar conversion year range
//!
//! Configuration is stored at `~/.config/moonbell/config.toml`. Secrets
//! can be supplied from the environment instead of the file:
//! `MOONBELL_CALDAV_PASSWORD` and `MOONBELL_BOT_TOKEN`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError};
use crate::lunar;
use crate::reminder::ReminderOffset;

/// CalDAV connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Base URL of the CalDAV server.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    /// Prefer MOONBELL_CALDAV_PASSWORD over storing this in the file.
    #[serde(default)]
    pub password: String,
    /// Collection hrefs (relative to `url`) or absolute collection URLs.
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            collections: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Prefer MOONBELL_BOT_TOKEN over storing this in the file.
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: i64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Reminder evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_offsets")]
    pub offsets: Vec<ReminderOffset>,
    /// Local hour reminders fire at.
    #[serde(default = "default_fire_hour")]
    pub fire_hour: u32,
    #[serde(default)]
    pub fire_minute: u32,
    /// Minutes between evaluation ticks.
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u32,
    /// Days of upcoming events fetched per tick.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            offsets: default_offsets(),
            fire_hour: default_fire_hour(),
            fire_minute: 0,
            tick_minutes: default_tick_minutes(),
            horizon_days: default_horizon_days(),
        }
    }
}

/// Lunar conversion year range; must lie within the embedded table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LunarConfig {
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

impl Default for LunarConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

impl LunarConfig {
    pub fn range(&self) -> (i32, i32) {
        (self.min_year, self.max_year)
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/moonbell/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA zone all dates are interpreted in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub lunar: LunarConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            calendar: CalendarConfig::default(),
            telegram: TelegramConfig::default(),
            reminders: ReminderConfig::default(),
            lunar: LunarConfig::default(),
        }
    }
}

// Default functions
fn default_timezone() -> String {
    "Asia/Seoul".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_offsets() -> Vec<ReminderOffset> {
    vec![
        ReminderOffset::SameDay,
        ReminderOffset::WeekBefore,
        ReminderOffset::MonthBefore,
    ]
}
fn default_fire_hour() -> u32 {
    7
}
fn default_tick_minutes() -> u32 {
    60
}
fn default_horizon_days() -> u32 {
    60
}
fn default_min_year() -> i32 {
    lunar::FIRST_YEAR
}
fn default_max_year() -> i32 {
    lunar::LAST_YEAR
}

impl Config {
    /// Path of the configuration file.
    pub fn path() -> Result<std::path::PathBuf, CoreError> {
        let dir = data_dir().map_err(|e| CoreError::Custom(e.to_string()))?;
        Ok(dir.join("config.toml"))
    }

    /// Load configuration, applying environment overrides for secrets.
    ///
    /// A missing file yields the defaults (then environment overrides), so
    /// a fully env-configured deployment needs no file at all.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
            toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var("MOONBELL_CALDAV_PASSWORD") {
            self.calendar.password = password;
        }
        if let Ok(token) = std::env::var("MOONBELL_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
    }

    /// Parsed IANA zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "timezone".to_string(),
                message: format!("unknown IANA zone '{}'", self.timezone),
            })
    }

    /// Local time of day reminders fire at.
    pub fn fire_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::from_hms_opt(self.reminders.fire_hour, self.reminders.fire_minute, 0).ok_or(
            ConfigError::InvalidValue {
                key: "reminders.fire_hour/fire_minute".to_string(),
                message: format!(
                    "{}:{:02} is not a time of day",
                    self.reminders.fire_hour, self.reminders.fire_minute
                ),
            },
        )
    }

    /// Check internal consistency before the bot starts ticking.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tz()?;
        self.fire_time()?;
        if self.reminders.offsets.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "reminders.offsets".to_string(),
                message: "at least one offset is required".to_string(),
            });
        }
        if self.reminders.tick_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "reminders.tick_minutes".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.lunar.min_year < lunar::FIRST_YEAR
            || self.lunar.max_year > lunar::LAST_YEAR
            || self.lunar.min_year > self.lunar.max_year
        {
            return Err(ConfigError::InvalidValue {
                key: "lunar.min_year/max_year".to_string(),
                message: format!(
                    "range {}..={} must lie within {}..={}",
                    self.lunar.min_year,
                    self.lunar.max_year,
                    lunar::FIRST_YEAR,
                    lunar::LAST_YEAR
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone, "Asia/Seoul");
        assert_eq!(config.reminders.offsets.len(), 3);
        assert_eq!(config.lunar.range(), (lunar::FIRST_YEAR, lunar::LAST_YEAR));
    }

    #[test]
    fn test_parse_partial_toml() {
        let raw = r#"
            timezone = "Europe/Berlin"

            [calendar]
            url = "https://cal.example.com/dav/"
            username = "me"
            collections = ["personal"]

            [telegram]
            chat_id = 42

            [reminders]
            offsets = ["same-day", "day-before"]
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(
            config.reminders.offsets,
            vec![ReminderOffset::SameDay, ReminderOffset::DayBefore]
        );
        // untouched sections fall back to defaults
        assert_eq!(config.reminders.fire_hour, 7);
        assert_eq!(config.calendar.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timezone_rejected() {
        let config = Config {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_lunar_range_must_fit_table() {
        let config = Config {
            lunar: LunarConfig {
                min_year: 1800,
                max_year: 2049,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            lunar: LunarConfig {
                min_year: 2000,
                max_year: 2030,
            },
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}

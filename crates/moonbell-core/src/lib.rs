//! # Moonbell Core Library
//!
//! Core business logic for Moonbell, a CalDAV-to-Telegram reminder bot
//! with Korean lunar calendar support. All operations are available via
//! the standalone CLI binary; long-running deployments drive the same
//! library from a periodic tick.
//!
//! ## Architecture
//!
//! - **Lunar Converter**: table-driven solar/lunar conversion for
//!   1900-2049, including irregular leap months
//! - **Recurrence Resolver**: materializes yearly (lunar or Gregorian)
//!   anniversaries into concrete dates
//! - **Reminder Evaluator**: decides which (event, offset) pairs are due
//!   at a given instant, consulting the dedup store
//! - **Dedup Store**: SQLite table whose composite key guarantees
//!   at-most-one send per (event, offset, occurrence)
//! - **Collaborators**: CalDAV fetch and Telegram delivery behind trait
//!   seams
//!
//! ## Key Components
//!
//! - [`ReminderBot`]: the tick pipeline
//! - [`lunar::solar_to_lunar`] / [`lunar::lunar_to_solar`]: date conversion
//! - [`SentDb`]: dedup persistence
//! - [`Config`]: application configuration management

pub mod bot;
pub mod caldav;
pub mod error;
pub mod event;
pub mod lunar;
pub mod notify;
pub mod recurrence;
pub mod reminder;
pub mod storage;

pub use bot::{ReminderBot, TickReport};
pub use caldav::{CaldavClient, CalendarSource};
pub use error::{ConfigError, CoreError, DatabaseError, LunarError, Result};
pub use event::{Event, EventKind, LunarAnchor};
pub use lunar::LunarDate;
pub use notify::{Notifier, TelegramNotifier};
pub use recurrence::{Occurrence, Resolution};
pub use reminder::{DueReminder, Evaluator, ReminderOffset};
pub use storage::{Config, SentDb, SentStore};

//! Core error types for moonbell-core.
//!
//! This module defines the error hierarchy using thiserror. Sub-errors
//! convert into `CoreError` via `#[from]`, so `?` works across layers.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for moonbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Lunar calendar conversion errors
    #[error("Lunar calendar error: {0}")]
    Lunar(#[from] LunarError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Calendar collaborator errors (network, protocol, parse)
    #[error("Calendar error for '{collection}': {message}")]
    Calendar { collection: String, message: String },

    /// Notifier errors
    #[error("Notify error: {0}")]
    Notify(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    pub fn calendar(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Calendar {
            collection: collection.into(),
            message: message.into(),
        }
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }
}

/// Lunar conversion errors.
///
/// `OutOfRange` and `NoSuchDay` are expected at runtime (events anchored
/// outside the table, leap-only anchors); callers skip the affected
/// occurrence and keep going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LunarError {
    /// Year outside the supported conversion range
    #[error("year {year} outside supported lunar range {min}..={max}")]
    OutOfRange { year: i32, min: i32, max: i32 },

    /// Solar date before the table epoch or past its last covered day
    #[error("solar date {date} outside supported lunar range")]
    DateOutOfRange { date: chrono::NaiveDate },

    /// The (month, day, leap) combination does not exist in the year
    #[error("no lunar day {month}-{day} (leap month: {leap}) in year {year}")]
    NoSuchDay {
        year: i32,
        month: u32,
        day: u32,
        leap: bool,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Insert/update failed to persist
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lunar_error_display() {
        let err = LunarError::OutOfRange {
            year: 1899,
            min: 1900,
            max: 2049,
        };
        assert!(err.to_string().contains("1899"));
        assert!(err.to_string().contains("1900..=2049"));
    }

    #[test]
    fn test_sub_error_conversion() {
        let err: CoreError = LunarError::NoSuchDay {
            year: 2024,
            month: 1,
            day: 30,
            leap: false,
        }
        .into();
        assert!(matches!(err, CoreError::Lunar(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}

//! SQLite-backed record of dispatched reminders.
//!
//! The composite primary key (event_uid, offset, occurrence_date) is the
//! sole at-most-once guard in the system: two overlapping ticks that both
//! try to mark the same reminder resolve to a single row, and `mark_sent`
//! reports success either way. Rows are immutable once written and are
//! pruned after their occurrence date passes.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::{CoreError, DatabaseError};
use crate::reminder::ReminderOffset;

/// Read/write interface to the dedup table. The evaluator only reads;
/// the tick loop marks after a successful dispatch.
pub trait SentStore {
    fn has_sent(
        &self,
        uid: &str,
        offset: ReminderOffset,
        occurrence: NaiveDate,
    ) -> Result<bool, DatabaseError>;

    /// Record a dispatched reminder. A key collision (already recorded,
    /// e.g. by an overlapping tick) is success, not an error.
    fn mark_sent(
        &self,
        uid: &str,
        offset: ReminderOffset,
        occurrence: NaiveDate,
    ) -> Result<(), DatabaseError>;

    /// Remove records whose occurrence date is before `before`.
    fn prune_before(&self, before: NaiveDate) -> Result<usize, DatabaseError>;
}

/// A row of the sent_reminders table.
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub event_uid: String,
    pub offset: String,
    pub occurrence_date: String,
    pub sent_at: String,
}

/// SQLite database holding the dedup table.
pub struct SentDb {
    conn: Connection,
}

impl SentDb {
    /// Open the database at `~/.config/moonbell/moonbell.db`.
    ///
    /// Creates the file and schema if they don't exist.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()
            .map_err(|e| CoreError::Custom(e.to_string()))?
            .join("moonbell.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sent_reminders (
                event_uid       TEXT NOT NULL,
                offset          TEXT NOT NULL,
                occurrence_date TEXT NOT NULL,
                sent_at         TEXT NOT NULL,
                PRIMARY KEY (event_uid, offset, occurrence_date)
            );

            CREATE INDEX IF NOT EXISTS idx_sent_reminders_occurrence
                ON sent_reminders(occurrence_date);",
        )?;
        Ok(())
    }

    /// Most recent records, newest first (CLI inspection).
    pub fn list_recent(&self, limit: u32) -> Result<Vec<SentRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT event_uid, offset, occurrence_date, sent_at
             FROM sent_reminders
             ORDER BY sent_at DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(SentRecord {
                event_uid: row.get(0)?,
                offset: row.get(1)?,
                occurrence_date: row.get(2)?,
                sent_at: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

impl SentStore for SentDb {
    fn has_sent(
        &self,
        uid: &str,
        offset: ReminderOffset,
        occurrence: NaiveDate,
    ) -> Result<bool, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT 1 FROM sent_reminders
             WHERE event_uid = ?1 AND offset = ?2 AND occurrence_date = ?3",
        )?;
        let found = stmt.exists(params![uid, offset.as_str(), occurrence.to_string()])?;
        Ok(found)
    }

    fn mark_sent(
        &self,
        uid: &str,
        offset: ReminderOffset,
        occurrence: NaiveDate,
    ) -> Result<(), DatabaseError> {
        // OR IGNORE: a constraint hit means another tick already recorded
        // this key, which is exactly the state we want.
        self.conn
            .execute(
                "INSERT OR IGNORE INTO sent_reminders
                 (event_uid, offset, occurrence_date, sent_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    uid,
                    offset.as_str(),
                    occurrence.to_string(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    fn prune_before(&self, before: NaiveDate) -> Result<usize, DatabaseError> {
        let removed = self.conn.execute(
            "DELETE FROM sent_reminders WHERE occurrence_date < ?1",
            params![before.to_string()],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_mark_and_lookup() {
        let db = SentDb::open_memory().unwrap();
        let occ = date(2025, 4, 12);

        assert!(!db.has_sent("u1", ReminderOffset::SameDay, occ).unwrap());
        db.mark_sent("u1", ReminderOffset::SameDay, occ).unwrap();
        assert!(db.has_sent("u1", ReminderOffset::SameDay, occ).unwrap());

        // other offsets and dates stay independent
        assert!(!db.has_sent("u1", ReminderOffset::WeekBefore, occ).unwrap());
        assert!(!db
            .has_sent("u1", ReminderOffset::SameDay, date(2026, 5, 1))
            .unwrap());
    }

    #[test]
    fn test_duplicate_mark_is_success() {
        let db = SentDb::open_memory().unwrap();
        let occ = date(2025, 4, 12);

        db.mark_sent("u1", ReminderOffset::SameDay, occ).unwrap();
        // second mark of the same key: constraint hit, still Ok
        db.mark_sent("u1", ReminderOffset::SameDay, occ).unwrap();

        assert_eq!(db.list_recent(10).unwrap().len(), 1);
    }

    #[test]
    fn test_prune_removes_only_stale_rows() {
        let db = SentDb::open_memory().unwrap();
        db.mark_sent("old", ReminderOffset::SameDay, date(2025, 1, 1))
            .unwrap();
        db.mark_sent("current", ReminderOffset::SameDay, date(2025, 4, 12))
            .unwrap();

        let removed = db.prune_before(date(2025, 4, 1)).unwrap();
        assert_eq!(removed, 1);
        assert!(!db
            .has_sent("old", ReminderOffset::SameDay, date(2025, 1, 1))
            .unwrap());
        assert!(db
            .has_sent("current", ReminderOffset::SameDay, date(2025, 4, 12))
            .unwrap());
    }

    #[test]
    fn test_reopen_persists_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moonbell.db");
        let occ = date(2025, 4, 12);

        {
            let db = SentDb::open_at(&path).unwrap();
            db.mark_sent("u1", ReminderOffset::SameDay, occ).unwrap();
        }
        let db = SentDb::open_at(&path).unwrap();
        assert!(db.has_sent("u1", ReminderOffset::SameDay, occ).unwrap());
    }
}

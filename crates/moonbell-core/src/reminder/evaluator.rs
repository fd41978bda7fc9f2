//! Due-reminder evaluation.
//!
//! The evaluator is read-only with respect to the dedup store: it decides
//! what is due right now, and marking happens only after a successful
//! dispatch. Re-running it at the same instant without dispatching returns
//! the same set.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::error::DatabaseError;
use crate::event::Event;
use crate::recurrence::Occurrence;
use crate::reminder::ReminderOffset;
use crate::storage::SentStore;

/// A reminder that should be dispatched now.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub event: Event,
    pub offset: ReminderOffset,
    pub occurrence: chrono::NaiveDate,
}

/// Decides which (event, offset) pairs are due at a given instant.
///
/// A pair is due when `now` lies in `[trigger, trigger + tolerance]`,
/// where `trigger` is the offset's date at the configured fire time.
/// The tolerance should exceed the tick interval so a late tick still
/// fires instead of missing the window.
pub struct Evaluator {
    offsets: Vec<ReminderOffset>,
    fire_time: NaiveTime,
    tolerance: Duration,
}

impl Evaluator {
    pub fn new(offsets: Vec<ReminderOffset>, fire_time: NaiveTime, tolerance: Duration) -> Self {
        Self {
            offsets,
            fire_time,
            tolerance,
        }
    }

    /// Evaluate resolved occurrences against `now` and the dedup store.
    ///
    /// Output is ordered by (occurrence date, summary, offset), matching
    /// the order messages are grouped in.
    pub fn evaluate(
        &self,
        occurrences: &[Occurrence],
        now: NaiveDateTime,
        store: &dyn SentStore,
    ) -> Result<Vec<DueReminder>, DatabaseError> {
        let mut due = Vec::new();

        for occ in occurrences {
            for &offset in &self.offsets {
                if !offset.applies_to(occ.event.yearly) {
                    continue;
                }
                let Some(trigger_date) = offset.trigger_date(occ.date) else {
                    continue;
                };
                let trigger = trigger_date.and_time(self.fire_time);
                if now < trigger || now - trigger > self.tolerance {
                    continue;
                }
                if store.has_sent(&occ.event.uid, offset, occ.date)? {
                    continue;
                }
                due.push(DueReminder {
                    event: occ.event.clone(),
                    offset,
                    occurrence: occ.date,
                });
            }
        }

        due.sort_by(|a, b| {
            (a.occurrence, &a.event.summary, a.offset.as_str())
                .cmp(&(b.occurrence, &b.event.summary, b.offset.as_str()))
        });
        Ok(due)
    }
}

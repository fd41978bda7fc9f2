//! Tick orchestration.
//!
//! [`ReminderBot`] is the process-wide component: explicit construction
//! (validate config, open the dedup store, build collaborators), no
//! ambient globals. Each tick runs the fetch -> resolve -> evaluate ->
//! dispatch -> mark pipeline; no error inside a tick is fatal to the
//! host loop.

use std::collections::BTreeMap;

use chrono::{Days, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::caldav::{CaldavClient, CalendarSource};
use crate::error::Result;
use crate::notify::format;
use crate::notify::{Notifier, TelegramNotifier};
use crate::recurrence::resolve_events;
use crate::reminder::{DueReminder, Evaluator};
use crate::storage::{Config, SentDb, SentStore};

/// What one tick did. Serialized by the CLI.
#[derive(Debug, Default, Clone, Serialize)]
pub struct TickReport {
    /// Events fetched from the calendar.
    pub events: usize,
    /// Concrete occurrences after recurrence resolution.
    pub occurrences: usize,
    /// Occurrences skipped (out-of-range or nonexistent lunar days).
    pub skipped: usize,
    /// Reminders due this tick.
    pub due: usize,
    /// Reminders dispatched and marked.
    pub sent: usize,
    /// Reminders whose dispatch failed (will retry next tick).
    pub failed: usize,
    /// Dispatched reminders whose mark failed twice (may duplicate).
    pub unmarked: usize,
    /// Stale dedup rows pruned.
    pub pruned: usize,
}

/// The reminder bot: dedup store plus calendar and notifier collaborators.
pub struct ReminderBot<C, N> {
    config: Config,
    tz: Tz,
    store: SentDb,
    calendar: C,
    notifier: N,
    evaluator: Evaluator,
}

impl ReminderBot<CaldavClient, TelegramNotifier> {
    /// Build the production bot from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let tz = config.tz()?;
        let store = SentDb::open()?;
        let calendar = CaldavClient::new(&config.calendar, tz)?;
        let notifier = TelegramNotifier::new(&config.telegram)?;
        Self::new(config, store, calendar, notifier)
    }
}

impl<C: CalendarSource, N: Notifier> ReminderBot<C, N> {
    /// Assemble a bot from explicit parts (tests swap in stubs here).
    pub fn new(config: Config, store: SentDb, calendar: C, notifier: N) -> Result<Self> {
        let tz = config.tz()?;
        // tolerance of two ticks: a late tick still fires, a missed
        // window stays missed
        let tolerance = Duration::minutes(2 * config.reminders.tick_minutes as i64);
        let evaluator = Evaluator::new(
            config.reminders.offsets.clone(),
            config.fire_time()?,
            tolerance,
        );
        Ok(Self {
            config,
            tz,
            store,
            calendar,
            notifier,
            evaluator,
        })
    }

    /// Current wall-clock time in the configured zone.
    pub fn now_local(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.tz).naive_local()
    }

    pub fn store(&self) -> &SentDb {
        &self.store
    }

    pub fn tick_minutes(&self) -> u32 {
        self.config.reminders.tick_minutes
    }

    /// Run one evaluation cycle at the given instant.
    ///
    /// A fetch failure abandons the tick before any dedup write; entries
    /// already marked in earlier ticks stand.
    pub fn run_tick_at(&self, now: NaiveDateTime) -> Result<TickReport> {
        let today = now.date();
        let horizon = today
            .checked_add_days(Days::new(self.config.reminders.horizon_days as u64))
            .unwrap_or(today);

        let events = self.calendar.fetch_events(today, horizon)?;

        let resolution = resolve_events(&events, today, self.config.lunar.range());
        for skipped in &resolution.skipped {
            eprintln!(
                "skipping occurrence of '{}' ({}): {}",
                skipped.summary, skipped.uid, skipped.reason
            );
        }

        let due = self
            .evaluator
            .evaluate(&resolution.occurrences, now, &self.store)?;

        let mut report = TickReport {
            events: events.len(),
            occurrences: resolution.occurrences.len(),
            skipped: resolution.skipped.len(),
            due: due.len(),
            ..TickReport::default()
        };

        self.dispatch(&due, &mut report);

        match self.store.prune_before(today) {
            Ok(pruned) => report.pruned = pruned,
            Err(err) => eprintln!("prune failed: {err}"),
        }

        Ok(report)
    }

    /// Send due reminders grouped per occurrence date; mark only what was
    /// actually delivered.
    fn dispatch(&self, due: &[DueReminder], report: &mut TickReport) {
        let mut by_date: BTreeMap<NaiveDate, Vec<&DueReminder>> = BTreeMap::new();
        for reminder in due {
            by_date.entry(reminder.occurrence).or_default().push(reminder);
        }

        for (_date, group) in by_date {
            let cloned: Vec<DueReminder> = group.iter().map(|r| (*r).clone()).collect();
            let messages = format::format_messages(&cloned);

            let mut delivered = true;
            for message in &messages {
                if let Err(err) = self.notifier.send(message) {
                    eprintln!("send failed: {err}");
                    delivered = false;
                    break;
                }
            }

            if !delivered {
                report.failed += group.len();
                continue;
            }

            for reminder in &group {
                if self.mark_with_retry(reminder) {
                    report.sent += 1;
                } else {
                    report.sent += 1;
                    report.unmarked += 1;
                }
            }
        }
    }

    /// Mark a dispatched reminder, retrying once. Returns false when both
    /// attempts fail; the reminder may then duplicate on the next tick,
    /// which is preferred over silently losing it.
    fn mark_with_retry(&self, reminder: &DueReminder) -> bool {
        for attempt in 0..2 {
            match self.store.mark_sent(
                &reminder.event.uid,
                reminder.offset,
                reminder.occurrence,
            ) {
                Ok(()) => return true,
                Err(err) if attempt == 0 => {
                    eprintln!("mark_sent failed, retrying: {err}");
                }
                Err(err) => {
                    eprintln!(
                        "mark_sent failed twice for '{}' ({}, {}): {err}",
                        reminder.event.uid,
                        reminder.offset,
                        reminder.occurrence
                    );
                }
            }
        }
        false
    }

    /// Tick forever at the configured interval. Ticks are serialized; a
    /// tick's error is logged and the loop keeps going.
    pub fn run(&self) {
        let interval = std::time::Duration::from_secs(self.config.reminders.tick_minutes as u64 * 60);
        loop {
            match self.run_tick_at(self.now_local()) {
                Ok(report) => eprintln!(
                    "tick: {} events, {} due, {} sent, {} failed",
                    report.events, report.due, report.sent, report.failed
                ),
                Err(err) => eprintln!("tick failed: {err}"),
            }
            std::thread::sleep(interval);
        }
    }
}

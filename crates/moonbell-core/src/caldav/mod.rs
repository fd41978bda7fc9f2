//! CalDAV calendar source.
//!
//! Speaks the `calendar-query` REPORT with a server-side time-range filter
//! against each configured collection and ingests the returned VEVENTs.
//! Write support covers simple event create and delete, which is all the
//! bot's calendar ever needs.

mod ingest;

pub use ingest::ingest_ics;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use url::Url;

use crate::error::{CoreError, Result};
use crate::event::Event;
use crate::storage::CalendarConfig;

/// Anything that can supply events for a date range. The seam tests use
/// to feed the tick pipeline without a server.
pub trait CalendarSource {
    /// Events starting within `[start, end]`, in the configured zone.
    fn fetch_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>>;
}

/// CalDAV client over reqwest with basic auth and bounded timeouts.
pub struct CaldavClient {
    base: Url,
    username: String,
    password: String,
    collections: Vec<String>,
    tz: Tz,
    client: Client,
}

impl CaldavClient {
    pub fn new(config: &CalendarConfig, tz: Tz) -> Result<Self> {
        let base = Url::parse(&config.url)
            .map_err(|e| CoreError::calendar(&config.url, format!("invalid base URL: {e}")))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::calendar(&config.url, e.to_string()))?;
        Ok(Self {
            base,
            username: config.username.clone(),
            password: config.password.clone(),
            collections: config.collections.clone(),
            tz,
            client,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url> {
        if collection.starts_with("http://") || collection.starts_with("https://") {
            Url::parse(collection)
                .map_err(|e| CoreError::calendar(collection, format!("invalid URL: {e}")))
        } else {
            let href = format!("{}/", collection.trim_matches('/'));
            self.base
                .join(&href)
                .map_err(|e| CoreError::calendar(collection, format!("invalid href: {e}")))
        }
    }

    /// Fetch one collection's events via calendar-query REPORT.
    fn fetch_collection(
        &self,
        collection: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Event>> {
        let url = self.collection_url(collection)?;
        let body = report_body(start, end);

        let response = tokio::runtime::Handle::current().block_on(
            self.client
                .request(
                    reqwest::Method::from_bytes(b"REPORT")
                        .map_err(|e| CoreError::calendar(collection, e.to_string()))?,
                    url,
                )
                .basic_auth(&self.username, Some(&self.password))
                .header("Depth", "1")
                .header("Content-Type", "application/xml; charset=utf-8")
                .body(body)
                .send(),
        )
        .map_err(|e| CoreError::calendar(collection, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::calendar(
                collection,
                format!("REPORT failed: HTTP {status}"),
            ));
        }

        let text = tokio::runtime::Handle::current()
            .block_on(response.text())
            .map_err(|e| CoreError::calendar(collection, e.to_string()))?;

        let mut events = Vec::new();
        for ics in extract_calendar_data(&text)
            .map_err(|e| CoreError::calendar(collection, e))?
        {
            events.extend(ingest_ics(&ics, self.tz));
        }
        Ok(events)
    }

    /// Create a simple event in `collection`, returning its UID.
    pub fn create_event(
        &self,
        collection: &str,
        summary: &str,
        date: NaiveDate,
        yearly: bool,
    ) -> Result<String> {
        let uid = uuid::Uuid::new_v4().to_string();
        let url = self.event_url(collection, &uid)?;
        let ics = build_event_ics(&uid, summary, date, yearly);

        let response = tokio::runtime::Handle::current().block_on(
            self.client
                .put(url)
                .basic_auth(&self.username, Some(&self.password))
                .header("Content-Type", "text/calendar; charset=utf-8")
                .header("If-None-Match", "*")
                .body(ics)
                .send(),
        )
        .map_err(|e| CoreError::calendar(collection, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::calendar(
                collection,
                format!("PUT failed: HTTP {status}"),
            ));
        }
        Ok(uid)
    }

    /// Delete an event by UID.
    pub fn delete_event(&self, collection: &str, uid: &str) -> Result<()> {
        let url = self.event_url(collection, uid)?;
        let response = tokio::runtime::Handle::current().block_on(
            self.client
                .delete(url)
                .basic_auth(&self.username, Some(&self.password))
                .send(),
        )
        .map_err(|e| CoreError::calendar(collection, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::calendar(
                collection,
                format!("DELETE failed: HTTP {status}"),
            ));
        }
        Ok(())
    }

    fn event_url(&self, collection: &str, uid: &str) -> Result<Url> {
        let base = self.collection_url(collection)?;
        base.join(&format!("{uid}.ics"))
            .map_err(|e| CoreError::calendar(collection, format!("invalid event URL: {e}")))
    }
}

impl CalendarSource for CaldavClient {
    /// One collection failing (auth, network, parse) does not abort the
    /// others; its error is reported on stderr and its events are absent.
    fn fetch_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        let mut first_error: Option<CoreError> = None;

        for collection in &self.collections {
            match self.fetch_collection(collection, start, end) {
                Ok(mut found) => events.append(&mut found),
                Err(err) => {
                    eprintln!("calendar '{collection}': {err}");
                    first_error.get_or_insert(err);
                }
            }
        }

        // all sources down is a fetch failure; partial data is fine
        if events.is_empty() {
            if let Some(err) = first_error {
                return Err(err);
            }
        }
        Ok(events)
    }
}

/// calendar-query REPORT body with a time-range filter.
fn report_body(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        r#"<C:calendar-query xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <getetag/>
        <C:calendar-data/>
    </prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
            <C:comp-filter name="VEVENT">
                <C:time-range start="{}" end="{}"/>
            </C:comp-filter>
        </C:comp-filter>
    </C:filter>
</C:calendar-query>"#,
        caldav_datetime(start),
        caldav_datetime(end),
    )
}

/// CalDAV time-range format: `YYYYMMDDTHHMMSSZ`, midnight UTC.
fn caldav_datetime(date: NaiveDate) -> String {
    date.format("%Y%m%dT000000Z").to_string()
}

/// Pull every `calendar-data` payload out of a Multi-Status response.
fn extract_calendar_data(xml: &str) -> std::result::Result<Vec<String>, String> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| format!("bad multistatus: {e}"))?;
    Ok(doc
        .descendants()
        .filter(|n| n.tag_name().name() == "calendar-data")
        .filter_map(|n| n.text())
        .map(|t| t.to_string())
        .collect())
}

/// Minimal single-VEVENT ICS for event creation.
fn build_event_ics(uid: &str, summary: &str, date: NaiveDate, yearly: bool) -> String {
    let mut ics = String::new();
    ics.push_str("BEGIN:VCALENDAR\r\n");
    ics.push_str("VERSION:2.0\r\n");
    ics.push_str("PRODID:-//moonbell//moonbell//KO\r\n");
    ics.push_str("BEGIN:VEVENT\r\n");
    ics.push_str(&format!("UID:{uid}\r\n"));
    ics.push_str(&format!(
        "DTSTAMP:{}\r\n",
        Utc::now().format("%Y%m%dT%H%M%SZ")
    ));
    ics.push_str(&format!("SUMMARY:{summary}\r\n"));
    ics.push_str(&format!("DTSTART;VALUE=DATE:{}\r\n", date.format("%Y%m%d")));
    if yearly {
        ics.push_str("RRULE:FREQ=YEARLY\r\n");
    }
    ics.push_str("END:VEVENT\r\n");
    ics.push_str("END:VCALENDAR\r\n");
    ics
}

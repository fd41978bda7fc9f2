//! HTTP-level tests for the CalDAV and Telegram adapters against a mock
//! server.

use chrono::NaiveDate;
use moonbell_core::caldav::{CaldavClient, CalendarSource};
use moonbell_core::event::EventKind;
use moonbell_core::notify::{Notifier, TelegramNotifier};
use moonbell_core::storage::{CalendarConfig, TelegramConfig};

const MULTISTATUS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:" xmlns:cal="urn:ietf:params:xml:ns:caldav">
  <d:response>
    <d:href>/personal/birthday-1.ics</d:href>
    <d:propstat>
      <d:prop>
        <d:getetag>"etag-1"</d:getetag>
        <cal:calendar-data>BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:birthday-1
SUMMARY:어머니 생신 (음력 3월 15일)
DTSTART;VALUE=DATE:20240423
RRULE:FREQ=YEARLY
END:VEVENT
END:VCALENDAR</cal:calendar-data>
      </d:prop>
      <d:status>HTTP/1.1 200 OK</d:status>
    </d:propstat>
  </d:response>
</d:multistatus>"#;

fn calendar_config(server_url: &str) -> CalendarConfig {
    CalendarConfig {
        url: format!("{server_url}/"),
        username: "user".to_string(),
        password: "secret".to_string(),
        collections: vec!["personal".to_string()],
        timeout_secs: 5,
    }
}

#[test]
fn caldav_report_fetch_and_ingest() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("REPORT", "/personal/")
        .match_header("Depth", "1")
        .with_status(207)
        .with_header("Content-Type", "application/xml")
        .with_body(MULTISTATUS)
        .create();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let client = CaldavClient::new(&calendar_config(&server.url()), chrono_tz::Asia::Seoul).unwrap();
    let events = client
        .fetch_events(
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        )
        .unwrap();

    mock.assert();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].uid, "birthday-1");
    assert!(events[0].yearly);
    assert!(matches!(events[0].kind, EventKind::Lunar(_)));
}

#[test]
fn caldav_server_error_is_reported() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("REPORT", "/personal/")
        .with_status(401)
        .create();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let client = CaldavClient::new(&calendar_config(&server.url()), chrono_tz::Asia::Seoul).unwrap();
    let result = client.fetch_events(
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
    );
    assert!(result.is_err());
}

#[test]
fn caldav_create_and_delete_event() {
    let mut server = mockito::Server::new();
    let event_path = mockito::Matcher::Regex(r"^/personal/[0-9a-f-]+\.ics$".to_string());
    let put_mock = server
        .mock("PUT", event_path.clone())
        .with_status(201)
        .create();
    let delete_mock = server.mock("DELETE", event_path).with_status(204).create();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let client = CaldavClient::new(&calendar_config(&server.url()), chrono_tz::Asia::Seoul).unwrap();
    let uid = client
        .create_event(
            "personal",
            "새 기념일",
            NaiveDate::from_ymd_opt(2025, 4, 12).unwrap(),
            true,
        )
        .unwrap();
    put_mock.assert();

    client.delete_event("personal", &uid).unwrap();
    delete_mock.assert();
}

#[test]
fn telegram_send_checks_ok_flag() {
    let mut server = mockito::Server::new();
    let ok_mock = server
        .mock("POST", "/bottesttoken/sendMessage")
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let config = TelegramConfig {
        bot_token: "testtoken".to_string(),
        chat_id: 42,
        timeout_secs: 5,
    };
    let notifier = TelegramNotifier::with_api_base(&config, &server.url()).unwrap();
    notifier.send("<b>🗓️ 2025-04-12 (토) 알림</b>").unwrap();
    ok_mock.assert();
}

#[test]
fn telegram_api_error_fails_the_send() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/bottesttoken/sendMessage")
        .with_status(400)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
        .create();

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let config = TelegramConfig {
        bot_token: "testtoken".to_string(),
        chat_id: 42,
        timeout_secs: 5,
    };
    let notifier = TelegramNotifier::with_api_base(&config, &server.url()).unwrap();
    let err = notifier.send("hello").unwrap_err();
    assert!(err.to_string().contains("chat not found"));
}

#[test]
fn telegram_requires_token() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    let notifier = TelegramNotifier::new(&TelegramConfig::default()).unwrap();
    assert!(notifier.send("hello").is_err());
}

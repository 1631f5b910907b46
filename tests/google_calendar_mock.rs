use axum::http::StatusCode;
use chrono_tz::Tz;
use tapahtuma::google::calendar::error_message;
use tapahtuma::google::{CreatedEvent, EventDraft, EventPayload, ValidationErrors};
use tokio::sync::RwLock;

/// Mock implementation of the calendar client for testing the submit path
#[derive(Default)]
pub struct MockCalendarClient {
    inserted: RwLock<Vec<EventPayload>>,
}

impl MockCalendarClient {
    /// Record the payload and answer like a successful insert
    pub async fn insert_event(&self, payload: &EventPayload) -> CreatedEvent {
        self.inserted.write().await.push(payload.clone());
        CreatedEvent {
            id: "event1".to_string(),
            summary: Some(payload.summary.clone()),
            status: Some("confirmed".to_string()),
            html_link: Some("https://calendar.google.com/event?eid=event1".to_string()),
        }
    }

    /// The submit path: validation gates the network call
    pub async fn submit(
        &self,
        draft: &EventDraft,
        tz: Tz,
    ) -> Result<CreatedEvent, ValidationErrors> {
        let payload = draft.prepare(tz)?;
        Ok(self.insert_event(&payload).await)
    }

    pub async fn inserted_count(&self) -> usize {
        self.inserted.read().await.len()
    }
}

fn valid_draft() -> EventDraft {
    EventDraft {
        title: "Standup".to_string(),
        description: "Daily".to_string(),
        location: "Zoom".to_string(),
        start: "2024-01-01T09:00".to_string(),
        end: "2024-01-01T09:15".to_string(),
    }
}

/// A valid draft issues exactly one insert
#[tokio::test]
async fn test_valid_draft_issues_one_insert() {
    let mock = MockCalendarClient::default();

    let created = mock.submit(&valid_draft(), chrono_tz::UTC).await.unwrap();

    assert_eq!(created.id, "event1");
    assert_eq!(mock.inserted_count().await, 1);

    let inserted = mock.inserted.read().await;
    assert_eq!(inserted[0].summary, "Standup");
    assert_eq!(inserted[0].description, "Daily");
    assert_eq!(inserted[0].location, "Zoom");
}

/// An invalid draft never reaches the client
#[tokio::test]
async fn test_invalid_draft_issues_no_insert() {
    let mock = MockCalendarClient::default();

    let draft = EventDraft {
        title: "".to_string(),
        ..valid_draft()
    };
    let result = mock.submit(&draft, chrono_tz::UTC).await;

    assert!(result.is_err());
    assert_eq!(mock.inserted_count().await, 0);
}

/// start >= end is rejected before any network call
#[tokio::test]
async fn test_inverted_times_issue_no_insert() {
    let mock = MockCalendarClient::default();

    let draft = EventDraft {
        start: "2024-01-01T10:00".to_string(),
        end: "2024-01-01T09:00".to_string(),
        ..valid_draft()
    };
    let result = mock.submit(&draft, chrono_tz::UTC).await;

    assert!(result.is_err());
    assert_eq!(mock.inserted_count().await, 0);
}

/// Google's error.message is surfaced when the body carries one
#[tokio::test]
async fn test_error_message_uses_provider_message() {
    let body = r#"{"error":{"code":401,"message":"Invalid Credentials"}}"#;
    let message = error_message(StatusCode::UNAUTHORIZED, body);

    assert!(message.contains("401"));
    assert!(message.contains("Invalid Credentials"));
    assert!(!message.contains("code"));
}

/// Unparseable error bodies fall back to the raw text
#[tokio::test]
async fn test_error_message_falls_back_to_body() {
    let message = error_message(StatusCode::BAD_GATEWAY, "upstream exploded");

    assert!(message.contains("502"));
    assert!(message.contains("upstream exploded"));
}

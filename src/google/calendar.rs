use reqwest::{Client, StatusCode};
use tracing::info;
use url::Url;

use super::models::{CreatedEvent, EventPayload};
use crate::error::{google_calendar_error, AppResult};

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Thin client for the Google Calendar REST API
#[derive(Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: CALENDAR_API_BASE.to_string(),
        }
    }

    /// Create one event in the given calendar. No retries; a failure is
    /// surfaced to the caller with Google's message when one is available.
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        payload: &EventPayload,
    ) -> AppResult<CreatedEvent> {
        let url = Url::parse(&format!(
            "{}/calendars/{}/events",
            self.base_url, calendar_id
        ))
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .json(payload)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to create event: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&error_message(status, &error_body)));
        }

        let created: CreatedEvent = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse event response: {}", e)))?;

        info!("Created calendar event {}", created.id);

        Ok(created)
    }
}

/// Pull Google's `error.message` out of an error body when present,
/// otherwise fall back to the raw body.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let provider_message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        });

    match provider_message {
        Some(message) => format!("HTTP {} - {}", status, message),
        None => format!("HTTP {} - {}", status, body),
    }
}

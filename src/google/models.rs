use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::time::{parse_datetime_local, to_rfc3339_in};

/// One unsaved event, exactly as typed into the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Raw value of the start datetime-local input
    pub start: String,
    /// Raw value of the end datetime-local input
    pub end: String,
}

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Empty after trimming
    Required,
    /// Present but not parseable
    Invalid,
    /// End is not strictly after start
    EndNotAfterStart,
}

impl FieldError {
    /// Translation key for the inline error message
    pub fn message_key(&self) -> &'static str {
        match self {
            FieldError::Required => "field_required",
            FieldError::Invalid => "field_invalid",
            FieldError::EndNotAfterStart => "end_not_after_start",
        }
    }
}

/// Per-field validation failures for a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub title: Option<FieldError>,
    pub description: Option<FieldError>,
    pub location: Option<FieldError>,
    pub start: Option<FieldError>,
    pub end: Option<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }
}

impl EventDraft {
    /// Check all five fields. Text fields must be non-empty after trim,
    /// both times must parse, and start must be strictly before end.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        if self.title.trim().is_empty() {
            errors.title = Some(FieldError::Required);
        }
        if self.description.trim().is_empty() {
            errors.description = Some(FieldError::Required);
        }
        if self.location.trim().is_empty() {
            errors.location = Some(FieldError::Required);
        }

        let start = if self.start.trim().is_empty() {
            errors.start = Some(FieldError::Required);
            None
        } else {
            let parsed = parse_datetime_local(&self.start);
            if parsed.is_none() {
                errors.start = Some(FieldError::Invalid);
            }
            parsed
        };

        let end = if self.end.trim().is_empty() {
            errors.end = Some(FieldError::Required);
            None
        } else {
            let parsed = parse_datetime_local(&self.end);
            if parsed.is_none() {
                errors.end = Some(FieldError::Invalid);
            }
            parsed
        };

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                errors.end = Some(FieldError::EndNotAfterStart);
            }
        }

        errors
    }

    /// Validate the draft and, when it passes, serialize it into the wire
    /// payload for the given timezone. No payload is built for an invalid
    /// draft, so nothing downstream can issue a request for one.
    pub fn prepare(&self, tz: Tz) -> Result<EventPayload, ValidationErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        // Both parses succeeded during validation
        let start = parse_datetime_local(&self.start)
            .and_then(|naive| to_rfc3339_in(naive, tz))
            .ok_or_else(|| ValidationErrors {
                start: Some(FieldError::Invalid),
                ..Default::default()
            })?;
        let end = parse_datetime_local(&self.end)
            .and_then(|naive| to_rfc3339_in(naive, tz))
            .ok_or_else(|| ValidationErrors {
                end: Some(FieldError::Invalid),
                ..Default::default()
            })?;

        Ok(EventPayload {
            summary: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            start: EventDateTime {
                date_time: start,
                time_zone: tz.name().to_string(),
            },
            end: EventDateTime {
                date_time: end,
                time_zone: tz.name().to_string(),
            },
        })
    }
}

/// Request body for the Google Calendar events.insert call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

/// Subset of Google's event resource we read back after insert
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

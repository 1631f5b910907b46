pub mod calendar;
pub mod models;
pub mod oauth;

pub use calendar::CalendarClient;
pub use models::{CreatedEvent, EventDraft, EventPayload, FieldError, ValidationErrors};
pub use oauth::{GoogleUser, OAuthClient, TokenSet};

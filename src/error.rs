use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(tapahtuma::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(tapahtuma::config))]
    Config(String),

    #[error("OAuth error: {0}")]
    #[diagnostic(code(tapahtuma::oauth))]
    OAuth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(tapahtuma::google_calendar))]
    GoogleCalendar(String),

    #[error("Session error: {0}")]
    #[diagnostic(code(tapahtuma::session))]
    Session(String),

    #[error(transparent)]
    #[diagnostic(code(tapahtuma::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(tapahtuma::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(tapahtuma::other))]
    Other(String),
}

// Implement From for JSON serialization errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create OAuth errors
pub fn oauth_error(message: &str) -> Error {
    Error::OAuth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create session errors
pub fn session_error(message: &str) -> Error {
    Error::Session(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
